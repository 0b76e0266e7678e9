//! Fixed-timestep simulation time.
//!
//! Rendering runs at whatever rate the host manages; the simulation always
//! advances in equal steps. Real frame time is accumulated and converted
//! into a whole number of steps, with the remainder carried to the next
//! frame and exposed as an interpolation factor.

use crate::constants::{FIXED_TIMESTEP, MAX_STEPS_PER_FRAME};

// =============================================================================
// GAME CLOCK
// =============================================================================

/// Simulation clock (in seconds)
#[derive(Debug, Clone)]
pub struct GameClock {
    /// Simulated seconds since the level started
    pub time: f32,
    /// Fixed steps run so far
    pub ticks: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self { time: 0.0, ticks: 0 }
    }

    /// Advance by one fixed step of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        debug_assert!(dt >= 0.0, "Cannot go backwards in time: {dt}");
        self.time += dt;
        self.ticks += 1;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FIXED TIMESTEP
// =============================================================================

/// Accumulator that turns variable frame times into fixed update steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_steps: u32,
    /// Seconds thrown away because a frame needed more than `max_steps`
    dropped: f32,
}

impl FixedTimestep {
    pub fn new(step: f32, max_steps: u32) -> Self {
        debug_assert!(step > 0.0, "timestep must be positive");
        Self {
            step,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            dropped: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one frame's elapsed real time; returns how many fixed steps to run.
    ///
    /// When a frame would need more than `max_steps` steps the excess time is
    /// dropped, so a long stall does not snowball into ever longer frames.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            self.dropped += self.accumulator - self.accumulator % self.step;
            self.accumulator %= self.step;
        }

        steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    pub fn dropped_time(&self) -> f32 {
        self.dropped
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(FIXED_TIMESTEP, MAX_STEPS_PER_FRAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut ts = FixedTimestep::new(0.1, 5);
        assert_eq!(ts.advance(0.04), 0);
        assert_eq!(ts.advance(0.04), 0);
        assert_eq!(ts.advance(0.04), 1);
        assert_relative_eq!(ts.alpha(), 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_multiple_steps_in_one_frame() {
        let mut ts = FixedTimestep::new(0.1, 5);
        assert_eq!(ts.advance(0.35), 3);
        assert_relative_eq!(ts.alpha(), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut ts = FixedTimestep::new(0.1, 5);
        assert_eq!(ts.advance(2.0), 5);
        assert!(ts.alpha() < 1.0);
        assert!(ts.dropped_time() > 1.0);
        // Next frame starts fresh rather than catching up
        assert!(ts.advance(0.0) <= 1);
    }

    #[test]
    fn test_negative_frame_time_ignored() {
        let mut ts = FixedTimestep::new(0.1, 5);
        assert_eq!(ts.advance(-1.0), 0);
        assert_eq!(ts.alpha(), 0.0);
    }

    #[test]
    fn test_clock_counts_ticks() {
        let mut clock = GameClock::new();
        clock.advance(0.5);
        clock.advance(0.5);
        assert_eq!(clock.ticks, 2);
        assert_relative_eq!(clock.time, 1.0);
    }
}

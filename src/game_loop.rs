//! Game loop and time advancement.
//!
//! Turns real frame time into fixed simulation steps. The host calls
//! `run_frame` once per rendered (or simulated) frame with the elapsed time
//! and a way to read input; the loop runs however many fixed steps are due,
//! then drains the event queue.

use crate::engine::{self, EventSummary, GameState};
use crate::systems::player_input::PlayerInput;
use crate::time_system::FixedTimestep;

/// Result of one host frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameResult {
    /// Fixed steps run this frame
    pub steps: u32,
    /// Interpolation factor between the last two steps
    pub alpha: f32,
    pub player_died: bool,
}

/// Owns the timestep and the running event tally.
#[derive(Debug, Default)]
pub struct GameLoop {
    pub timestep: FixedTimestep,
    pub summary: EventSummary,
}

impl GameLoop {
    pub fn new(timestep: FixedTimestep) -> Self {
        Self {
            timestep,
            summary: EventSummary::default(),
        }
    }

    /// Run the fixed steps due after `frame_dt` seconds of real time.
    ///
    /// `input` is asked once per step so a driver can react to the state the
    /// previous step left behind.
    pub fn run_frame(
        &mut self,
        state: &mut GameState,
        frame_dt: f32,
        mut input: impl FnMut(&GameState) -> PlayerInput,
    ) -> FrameResult {
        puffin::profile_function!();

        let mut result = FrameResult::default();
        let due = self.timestep.advance(frame_dt);
        let dt = self.timestep.step();

        for _ in 0..due {
            let player_input = input(state);
            let step = engine::step(state, &player_input, dt);
            result.steps += 1;
            if step.player_died {
                result.player_died = true;
                break;
            }
        }

        engine::process_events(
            &mut state.events,
            state.player_entity,
            state.log,
            &mut self.summary,
        );

        result.alpha = self.timestep.alpha();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;

    #[test]
    fn test_frame_runs_due_steps() {
        let mut state = GameState::from_level(&LevelData::demo(), 3).unwrap();
        let mut game_loop = GameLoop::new(FixedTimestep::new(0.01, 5));

        let result = game_loop.run_frame(&mut state, 0.035, |_| PlayerInput::default());
        assert_eq!(result.steps, 3);
        assert_eq!(state.clock.ticks, 3);
        assert!(state.events.is_empty());

        let capped = game_loop.run_frame(&mut state, 1.0, |_| PlayerInput::default());
        assert_eq!(capped.steps, 5);
    }

    #[test]
    fn test_input_is_read_every_step() {
        let mut state = GameState::from_level(&LevelData::demo(), 3).unwrap();
        let mut game_loop = GameLoop::new(FixedTimestep::new(0.01, 10));
        let mut calls = 0;
        game_loop.run_frame(&mut state, 0.045, |_| {
            calls += 1;
            PlayerInput::default()
        });
        assert_eq!(calls, 4);
    }
}

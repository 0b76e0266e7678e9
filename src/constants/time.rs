//! Time system constants.

/// Simulation steps per second
pub const TICKS_PER_SECOND: u32 = 60;
/// Duration of one fixed simulation step (seconds)
pub const FIXED_TIMESTEP: f32 = 1.0 / TICKS_PER_SECOND as f32;
/// Most fixed steps run for a single rendered frame before time is dropped
pub const MAX_STEPS_PER_FRAME: u32 = 5;

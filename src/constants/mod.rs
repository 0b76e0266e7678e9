//! Tuning constants organized by domain.
//!
//! Per-level values (weapons, enemy stats) live in the level file; these are
//! the defaults and engine-wide knobs.

mod collision;
mod enemies;
mod player;
mod time;

pub use collision::*;
pub use enemies::*;
pub use player::*;
pub use time::*;

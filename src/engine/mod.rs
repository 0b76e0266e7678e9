//! Game engine - owns all game state and provides a clean API to the host.
//!
//! The engine handles:
//! - Game state (world, collision map, waypoint graph, clock)
//! - Advancing the simulation one fixed step at a time
//! - Event processing
//!
//! The host (main.rs, or a windowed front end) only handles:
//! - Turning its input into a `PlayerInput`
//! - Driving the fixed-step loop
//! - Drawing what the engine exposes

mod game_state;
pub mod initialization;
mod simulation;

pub use game_state::{GameState, AI_LOG, COLLISION_LOG, GAME_LOG, PATHFINDING_LOG};
pub use simulation::{process_events, step, EventSummary, StepResult};

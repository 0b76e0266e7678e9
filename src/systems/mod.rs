//! Game systems organized by domain.
//!
//! This module contains all game logic systems, split into focused submodules:
//! - `ai`: enemy perception, the steering state machine and path following
//! - `combat`: cooldowns, player attacks, damage, and death handling
//! - `movement`: axis-separated movement against the collision map
//! - `player_input`: input data, aim ray updates, and the headless autopilot

pub mod ai;
pub mod combat;
pub mod movement;
pub mod player_input;

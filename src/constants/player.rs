//! Player constants.

use std::f32::consts::FRAC_PI_4;

/// Player movement speed (world units per second)
pub const PLAYER_SPEED: f32 = 90.0;
/// Player collision box (width, height)
pub const PLAYER_HITBOX_SIZE: (f32, f32) = (9.0, 15.0);
/// Player starting health
pub const PLAYER_HEALTH: i32 = 100;
/// Half-angle of the arc a melee swing covers around the aim direction
pub const MELEE_ARC_HALF_ANGLE: f32 = FRAC_PI_4;

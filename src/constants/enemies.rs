//! Enemy AI defaults.

/// Distance within which an enemy notices a visible target
pub const DEFAULT_DETECTION_RADIUS: f32 = 160.0;
/// Seconds a chasing enemy keeps going after losing its target
pub const TARGET_LOST_GRACE: f32 = 2.0;
/// Replan once the target is this far from the current path's goal
pub const PATH_REPLAN_TOLERANCE: f32 = 24.0;
/// Replan at least this often while following a path (seconds)
pub const PATH_REPLAN_INTERVAL: f32 = 1.0;
/// A path point counts as reached within this distance
pub const WAYPOINT_REACH_DISTANCE: f32 = 2.0;
/// Health fraction at or below which a fleeing-capable enemy runs away
pub const DEFAULT_FLEE_HEALTH_FRACTION: f32 = 0.25;
/// Default enemy collision box (width, height)
pub const ENEMY_HITBOX_SIZE: (f32, f32) = (10.0, 10.0);
/// Seconds between idle wander decisions
pub const IDLE_WANDER_INTERVAL: f32 = 3.0;
/// Maximum distance of an idle wander step
pub const IDLE_WANDER_RADIUS: f32 = 24.0;
/// Idle wandering moves at this fraction of normal speed
pub const IDLE_SPEED_FACTOR: f32 = 0.4;

//! Collision and raycast constants.

/// Default tile edge length in world units
pub const DEFAULT_TILE_SIZE: f32 = 16.0;
/// Rays and edges whose directions differ by less than this sine are treated as parallel
pub const PARALLEL_EPSILON: f32 = 1e-6;
/// Length of the player's aim ray
pub const AIM_RAY_LENGTH: f32 = 500.0;
/// Hits closer than this (world units) to an edge's end are treated as touching a tile corner
pub const CORNER_TOLERANCE: f32 = 1e-3;
/// Fraction of a tile stepped off a corner when sampling the tiles around it
pub const CORNER_SAMPLE_FRACTION: f32 = 0.01;

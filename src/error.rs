//! Error types for map building and level loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling the collision map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
    #[error("layer `{layer}` is {got_w}x{got_h} but the map is {want_w}x{want_h}")]
    LayerSizeMismatch {
        layer: String,
        want_w: usize,
        want_h: usize,
        got_w: usize,
        got_h: usize,
    },
}

/// Errors raised while loading a level description.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tile size must be positive, got {0}")]
    BadTileSize(f32),
    #[error("unknown weapon `{0}`")]
    UnknownWeapon(String),
    #[error("unknown enemy template `{0}`")]
    UnknownTemplate(String),
    #[error("{what} spawn at ({x}, {y}) overlaps a wall")]
    SpawnInWall { what: String, x: f32, y: f32 },
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

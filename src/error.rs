//! Construction-time errors. The per-tick numeric core never fails.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("path follower needs a path but the level has none")]
    MissingPath,

    #[error("path has no waypoints")]
    EmptyPath,

    #[error("path waypoint {index} is not finite")]
    NonFiniteWaypoint { index: usize },

    #[error("zone {index}: friction modifier {value} is outside (0, 1]")]
    InvalidFrictionModifier { index: usize, value: f32 },

    #[error("zone {index}: shape has non-positive or non-finite extents")]
    InvalidZoneShape { index: usize },

    #[error("level has no spawn points")]
    NoSpawnPoints,

    #[error("spawn point {index} is not finite")]
    InvalidSpawnPoint { index: usize },

    #[error("level bounds {value} must be finite and positive")]
    InvalidBounds { value: f32 },

    #[error("chassis vertices do not form a convex polygon")]
    DegenerateChassis,

    #[error("failed to read level file {path}: {source}")]
    LevelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level: {0}")]
    LevelParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

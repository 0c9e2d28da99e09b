// crates/artillery-core/src/error.rs

use thiserror::Error;

/// Configuration and collaborator-data problems. Ballistic outcomes (target out
/// of reach, degenerate geometry) are never reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("gravity must be positive and finite, got {0}")]
    InvalidGravity(f64),

    #[error("game-to-map scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("vertical epsilon must be in (0, 1), got {0}")]
    InvalidEpsilon(f64),

    #[error("heightmap grid {width}x{height} needs {expected} altitudes, got {actual}")]
    GridShape {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("heightmap cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("invalid engine config document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Parse(e.to_string())
    }
}

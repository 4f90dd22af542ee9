//! Error types for tracking and localization.

use thiserror::Error;

use crate::tracker::ObjectId;

/// Result type alias for the tracking core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the geometry model and depth estimators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid geometry configuration: {0}")]
    InvalidGeometryConfig(String),

    #[error("Unknown identity {0}: not present in the registry")]
    UnknownIdentity(ObjectId),

    #[error("Invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("Invalid depth {depth} for {id}")]
    InvalidDepth { id: ObjectId, depth: f64 },

    #[error("No depth reading available for {0}")]
    MissingDepth(ObjectId),
}

impl Error {
    pub fn geometry_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidGeometryConfig(msg.into())
    }
}

//! Error types for rectify-transform

use thiserror::Error;

/// Errors that can occur during geometric transformations
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] rectify_core::Error),

    /// Invalid transformation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Projection name that matches none of the known lens models
    #[error("unknown projection type: '{0}'")]
    UnknownProjection(String),
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

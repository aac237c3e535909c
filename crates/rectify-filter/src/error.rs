//! Error types for rectify-filter

use thiserror::Error;

/// Errors that can occur while running or persisting a filter
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] rectify_core::Error),

    /// Transform error
    #[error("transform error: {0}")]
    Transform(#[from] rectify_transform::TransformError),

    /// Filter state could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while reading or writing filter state
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

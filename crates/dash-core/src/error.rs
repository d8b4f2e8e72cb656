//! Error types for dash-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid frame payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid relay message: {0}")]
    InvalidRelay(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

//! Crate-wide error taxonomy.
//!
//! The render path itself never surfaces these — a failed render falls back
//! to a minimal prompt (see [`crate::prompt`]). These are for the handful of
//! entry points where a caller needs to distinguish failure categories:
//! worker submission, theme loading, and initialization.

use thiserror::Error;

/// Error codes exposed across the crate boundary.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("null or missing input")]
    NullPointer,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("out of memory")]
    OutOfMemory,

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("system call failed: {0}")]
    SystemCall(#[from] std::io::Error),

    #[error("not initialized")]
    NotInitialized,

    #[error("feature not available: {0}")]
    FeatureNotAvailable(String),
}

impl From<toml::de::Error> for PromptError {
    fn from(e: toml::de::Error) -> Self {
        PromptError::InvalidParameter(e.to_string())
    }
}

impl From<std::str::Utf8Error> for PromptError {
    fn from(e: std::str::Utf8Error) -> Self {
        PromptError::InvalidParameter(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;

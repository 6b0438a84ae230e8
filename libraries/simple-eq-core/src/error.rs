//! Core error types for Simple EQ

use thiserror::Error;

/// Result type alias using `EqError`
pub type Result<T> = std::result::Result<T, EqError>;

/// Core error type for Simple EQ
#[derive(Error, Debug)]
pub enum EqError {
    /// Persisted state could not be read; parameters fell back to defaults
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Parameter ID not present in the registry
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl EqError {
    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

//! Error types shared across dualseed crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, SeedError>;

/// Main error type for the common crate
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid user IDs: {0}")]
    InvalidUserIds(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SeedError {
    /// Create an invalid user IDs error
    pub fn invalid_user_ids(msg: impl Into<String>) -> Self {
        Self::InvalidUserIds(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

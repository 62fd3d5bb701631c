//! Common error types for Tally

use thiserror::Error;

use crate::jdb::ValidationError;

/// Common result type for Tally operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Tally crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record rejected by its schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted store file does not follow the jdb line format
    #[error("Malformed store file: {0}")]
    Format(String),
}

//! Common error types for persona

use thiserror::Error;

/// Common result type for persona operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the service layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request context ended before the operation finished
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

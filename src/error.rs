//! Error types for Chirp.

use thiserror::Error;

/// Common error type for Chirp.
#[derive(Error, Debug)]
pub enum ChirpError {
    /// Database error.
    ///
    /// A generic database error wrapping errors from the database backend.
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Conflict with existing state (duplicate email, duplicate follow, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for ChirpError {
    fn from(e: sqlx::Error) -> Self {
        ChirpError::Database(e.to_string())
    }
}

/// Result type alias for Chirp operations.
pub type Result<T> = std::result::Result<T, ChirpError>;

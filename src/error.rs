//! Error types for notekeeper.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for note operations
pub type NoteResult<T> = Result<T, NoteError>;

/// Main error type for note operations
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("Die Notiz mit ID {0} wurde nicht gefunden.")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store lock poisoned: {0}")]
    Lock(String),

    #[error("No note id left to allocate")]
    IdsExhausted,
}

impl NoteError {
    /// Create a not-found error for a note id (or the raw path segment that failed to parse)
    pub fn not_found(id: impl ToString) -> Self {
        NoteError::NotFound(id.to_string())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        NoteError::Config(message.into())
    }

    /// Returns true if the error was caused by the client (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, NoteError::Unauthorized | NoteError::NotFound(_))
    }
}

impl<T> From<std::sync::PoisonError<T>> for NoteError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        NoteError::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = NoteError::not_found(999);
        assert_eq!(err.to_string(), "Die Notiz mit ID 999 wurde nicht gefunden.");
    }

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(NoteError::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_error_classification() {
        assert!(NoteError::Unauthorized.is_client_error());
        assert!(NoteError::not_found("abc").is_client_error());
        assert!(!NoteError::config("bad").is_client_error());
        assert!(!NoteError::IdsExhausted.is_client_error());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!NoteError::from(io).is_client_error());
    }
}

//! Store error types
//!
//! Errors raised by the persistence service, whether in-process or remote.

use thiserror::Error;

use crate::store::types::ValidationError;

/// Errors that can occur while reading or writing guestbook entries
#[derive(Error, Debug)]
pub enum StoreError {
    /// Submission rejected by field checks
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No entry with this id
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Requester does not own the entry
    #[error("Not allowed to delete entry {0}")]
    Forbidden(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Journal record failed its checksum or framing
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// Store could not be reached (timeout, connection refused, closed feed)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Remote store answered with an error status
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Entry not found: abc");

        let err = StoreError::Validation(ValidationError::MissingMessage);
        assert_eq!(err.to_string(), "Validation error: Please write a message");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}

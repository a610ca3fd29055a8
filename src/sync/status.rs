//! User-visible status and synchronizer errors

use thiserror::Error;

use crate::store::{StoreError, ValidationError};

/// Inline status shown next to the form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// Session not established yet
    NotReady,
    /// A required field is missing or too long
    Invalid(ValidationError),
    /// Entry accepted by the store
    Sent,
    /// Store refused or could not be reached
    SendFailed(String),
    /// Waiting for the guest to confirm deleting this entry
    ConfirmDelete { id: String },
    Deleted,
    DeleteFailed(String),
}

impl Status {
    /// Text to show, if any
    pub fn message(&self) -> Option<String> {
        match self {
            Status::Idle => None,
            Status::NotReady => Some("Guestbook is still connecting, please wait.".to_string()),
            Status::Invalid(e) => Some(e.to_string()),
            Status::Sent => Some("Sent! Thank you for your wishes.".to_string()),
            Status::SendFailed(e) => Some(format!("Error sending: {}", e)),
            Status::ConfirmDelete { .. } => {
                Some("Delete this message? This cannot be undone.".to_string())
            }
            Status::Deleted => Some("Message deleted.".to_string()),
            Status::DeleteFailed(e) => Some(format!("Error deleting: {}", e)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::NotReady | Status::Invalid(_) | Status::SendFailed(_) | Status::DeleteFailed(_)
        )
    }
}

/// Errors returned by synchronizer operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Session is not ready")]
    NotReady,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Entry {0} is not in the guestbook")]
    UnknownEntry(String),

    #[error("Entry {0} was written by another guest")]
    NotOwner(String),

    #[error("No delete is waiting for confirmation")]
    NothingToConfirm,
}

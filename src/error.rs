//! Error types for farming session operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown to users when an operation failed for internal reasons.
pub const UNAVAILABLE_MESSAGE: &str =
    "The operation could not be completed. Please try again later.";

/// Errors produced by the session store and service.
///
/// Validation errors (`NotFound`, `Closed`, `AlreadyJoined`,
/// `EmptyParticipants`) and `PermissionDenied` are expected outcomes and are
/// rendered to users as short messages. The storage errors are operational
/// failures: they are logged and the user only learns that the operation did
/// not complete.
#[derive(Debug, Error)]
pub enum FarmingError {
    #[error("farming session '{code}' not found")]
    NotFound { code: String },

    #[error("farming session '{code}' is closed")]
    Closed { code: String },

    #[error("user '{user_id}' already joined farming session '{code}'")]
    AlreadyJoined { code: String, user_id: String },

    #[error("farming session '{code}' has no participants")]
    EmptyParticipants { code: String },

    #[error("user '{user_id}' lacks the privileged role")]
    PermissionDenied { user_id: String },

    #[error("session file {path:?} is corrupt: {reason}")]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("failed to read session file {path:?}: {source}")]
    StorageRead { path: PathBuf, source: io::Error },

    #[error("failed to write session file {path:?}: {source}")]
    StorageWrite { path: PathBuf, source: io::Error },

    #[error("no unused session code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, FarmingError>;

impl FarmingError {
    /// True for errors that are a normal answer to a user request.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            FarmingError::NotFound { .. }
                | FarmingError::Closed { .. }
                | FarmingError::AlreadyJoined { .. }
                | FarmingError::EmptyParticipants { .. }
                | FarmingError::PermissionDenied { .. }
        )
    }

    /// Short text suitable for showing to the user who made the request.
    ///
    /// Internal errors collapse to [`UNAVAILABLE_MESSAGE`] so file paths and
    /// OS error strings never reach chat.
    pub fn user_message(&self) -> &'static str {
        match self {
            FarmingError::NotFound { .. } => "Invalid farming code.",
            FarmingError::Closed { .. } => "This farming session is closed.",
            FarmingError::AlreadyJoined { .. } => "You have already joined this farming session.",
            FarmingError::EmptyParticipants { .. } => "No participants in this farming session.",
            FarmingError::PermissionDenied { .. } => {
                "You don't have permission to use this command."
            }
            FarmingError::StorageCorrupt { .. }
            | FarmingError::StorageRead { .. }
            | FarmingError::StorageWrite { .. }
            | FarmingError::CodeSpaceExhausted { .. } => UNAVAILABLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_user_facing() {
        let err = FarmingError::Closed {
            code: "1234567890".to_string(),
        };
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), "This farming session is closed.");
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = FarmingError::StorageWrite {
            path: PathBuf::from("/var/lib/farming/farmings.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_user_facing());
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);
        assert!(err.to_string().contains("farmings.json"));
    }
}

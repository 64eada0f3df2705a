//! Error types for session storage.

use thiserror::Error;

use crate::session::SessionId;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the session store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Version conflict: expected {expected}, actual {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),
}

//! SessionStore trait and versioning types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::session::{AssessmentSession, SessionId};

/// A value paired with its storage version for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Monotonically increasing per-session version
    pub version: u64,
    /// The stored value
    pub value: T,
}

/// Narrow persistence contract for assessment sessions.
///
/// Writes are optimistic: a save carries the version the caller loaded,
/// and the store rejects it with [`StoreError::Conflict`] if the session
/// moved on. The core never retries; callers re-load and decide.
///
/// [`StoreError::Conflict`]: super::StoreError::Conflict
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session with its current version.
    async fn load(&self, id: SessionId) -> Result<Versioned<AssessmentSession>>;

    /// Save a session.
    ///
    /// `expected = None` inserts a new session and fails if the id is
    /// already present; `expected = Some(version)` replaces the stored
    /// session only if the version still matches. Returns the new
    /// version.
    async fn save(&self, session: AssessmentSession, expected: Option<u64>) -> Result<u64>;
}

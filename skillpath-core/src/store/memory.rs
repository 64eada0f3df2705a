//! In-memory SessionStore implementation.
//!
//! Stores sessions in a map without persistence. Useful for tests and
//! single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{Result, StoreError};
use super::traits::{SessionStore, Versioned};
use crate::session::{AssessmentSession, SessionId};

/// In-memory implementation of [`SessionStore`].
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Versioned<AssessmentSession>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<Versioned<AssessmentSession>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, session: AssessmentSession, expected: Option<u64>) -> Result<u64> {
        let id = session.session_id;
        let mut sessions = self.sessions.write().await;

        match expected {
            None => {
                if sessions.contains_key(&id) {
                    return Err(StoreError::AlreadyExists(id));
                }
                sessions.insert(
                    id,
                    Versioned {
                        version: 1,
                        value: session,
                    },
                );
                Ok(1)
            }
            Some(expected) => {
                let Some(stored) = sessions.get_mut(&id) else {
                    return Err(StoreError::NotFound(id));
                };
                if stored.version != expected {
                    return Err(StoreError::Conflict {
                        expected,
                        actual: stored.version,
                    });
                }
                stored.version += 1;
                stored.value = session;
                Ok(stored.version)
            }
        }
    }
}

//! SessionManager: coordination between the state machine, the store,
//! and caller authorization.
//!
//! Mutations are serialized per session so at most one is in flight for a
//! given `SessionId` at a time; the double-submission race is the primary
//! hazard this guards against. Reads take no lock and operate on the
//! owned snapshot returned by the store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::auth::CallerContext;
use crate::catalog::{RoundCatalog, RoundId};
use crate::error::{SessionError, SkillpathError};
use crate::scoring::{self, ScoringConfig, WeaknessMap};
use crate::store::{SessionStore, Versioned};
use crate::template::AssessmentTemplate;

use super::state::{
    AssessmentSession, OverallStatus, RoundResult, RoundStatus, SessionId,
};

/// Read-only per-round projection for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Round identifier
    pub id: RoundId,
    /// Current status
    pub status: RoundStatus,
    /// Number of attempts so far
    pub attempt_count: u32,
    /// Score, when completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Read-only session projection for dashboards.
///
/// This is the only data the core publishes outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: SessionId,
    /// Session-level status
    pub overall_status: OverallStatus,
    /// The resumable round, if any
    pub current_round: Option<RoundId>,
    /// Per-round status in plan order
    pub rounds: Vec<RoundSnapshot>,
    /// Rolled-up score; `None` until a round completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    /// When the session was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the session completed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Manages assessment sessions against a [`SessionStore`].
///
/// Every operation takes an explicit [`CallerContext`] and verifies
/// ownership before touching the session. Store conflicts propagate
/// unchanged; the manager never retries storage.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    catalog: Arc<RoundCatalog>,
    scoring: ScoringConfig,
    /// Per-session mutation locks (single writer per session)
    locks: RwLock<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionManager {
    /// Create a manager with the default scoring configuration.
    pub fn new(store: Arc<dyn SessionStore>, catalog: Arc<RoundCatalog>) -> Self {
        Self {
            store,
            catalog,
            scoring: ScoringConfig::default(),
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the scoring configuration.
    #[must_use]
    pub fn with_scoring_config(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    // === Mutations (serialized per session) ===

    /// Create a new session for the caller from a template.
    pub async fn create_session(
        &self,
        ctx: &CallerContext,
        template: &AssessmentTemplate,
    ) -> Result<AssessmentSession, SkillpathError> {
        let session = AssessmentSession::new(ctx.student_id.clone(), template, &self.catalog)?;
        self.store.save(session.clone(), None).await?;
        info!(
            session_id = %session.session_id,
            student_id = %session.student_id,
            rounds = session.plan.len(),
            "created assessment session"
        );
        Ok(session)
    }

    /// Start (or resume) the current round.
    pub async fn start_round(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
        round_id: RoundId,
    ) -> Result<AssessmentSession, SkillpathError> {
        let session = self
            .mutate(ctx, session_id, |session| session.start_round(round_id))
            .await?;
        debug!(session_id = %session_id, round = %round_id, "round started");
        Ok(session)
    }

    /// Submit a result for an in-progress round.
    pub async fn submit_round(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
        round_id: RoundId,
        result: RoundResult,
    ) -> Result<AssessmentSession, SkillpathError> {
        let session = self
            .mutate(ctx, session_id, |session| {
                session.submit_round(round_id, result)
            })
            .await?;
        if session.overall_status == OverallStatus::Completed {
            info!(session_id = %session_id, "assessment session completed");
        } else {
            debug!(session_id = %session_id, round = %round_id, "round submitted");
        }
        Ok(session)
    }

    /// Skip the current round, where the template allows it.
    pub async fn skip_round(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
        round_id: RoundId,
    ) -> Result<AssessmentSession, SkillpathError> {
        let session = self
            .mutate(ctx, session_id, |session| session.skip_round(round_id))
            .await?;
        debug!(session_id = %session_id, round = %round_id, "round skipped");
        Ok(session)
    }

    /// Abandon a session.
    pub async fn abandon_session(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<AssessmentSession, SkillpathError> {
        let session = self
            .mutate(ctx, session_id, |session| session.abandon())
            .await?;
        info!(session_id = %session_id, "assessment session abandoned");
        Ok(session)
    }

    // === Reads (lock-free, consistent snapshot per call) ===

    /// The caller's resumable round, if any.
    pub async fn current_round(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<Option<RoundId>, SkillpathError> {
        let session = self.load_authorized(ctx, session_id).await?;
        Ok(session.current_round())
    }

    /// Rolled-up score across completed rounds.
    pub async fn overall_score(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<f64, SkillpathError> {
        let session = self.load_authorized(ctx, session_id).await?;
        Ok(scoring::overall_score(&session, &self.scoring)?)
    }

    /// Per-topic weakness derived from completed rounds.
    pub async fn weakness_map(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<WeaknessMap, SkillpathError> {
        let session = self.load_authorized(ctx, session_id).await?;
        Ok(scoring::weakness_map(&session, &self.scoring))
    }

    /// Full dashboard projection of one session.
    pub async fn snapshot(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<SessionSnapshot, SkillpathError> {
        let session = self.load_authorized(ctx, session_id).await?;

        let rounds = session
            .plan
            .iter()
            .filter_map(|entry| {
                session.round_state(entry.id).map(|state| RoundSnapshot {
                    id: entry.id,
                    status: state.status,
                    attempt_count: state.attempt_count,
                    score: state.score,
                })
            })
            .collect();

        Ok(SessionSnapshot {
            session_id: session.session_id,
            overall_status: session.overall_status,
            current_round: session.current_round(),
            rounds,
            overall_score: scoring::overall_score(&session, &self.scoring).ok(),
            created_at: session.created_at,
            completed_at: session.completed_at,
        })
    }

    // === Internals ===

    async fn mutate<F>(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
        apply: F,
    ) -> Result<AssessmentSession, SkillpathError>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<(), SessionError>,
    {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let Versioned {
            version,
            value: mut session,
        } = self.store.load(session_id).await?;
        ctx.authorize_owner(&session)?;
        apply(&mut session)?;
        self.store.save(session.clone(), Some(version)).await?;
        Ok(session)
    }

    async fn load_authorized(
        &self,
        ctx: &CallerContext,
        session_id: SessionId,
    ) -> Result<AssessmentSession, SkillpathError> {
        let versioned = self.store.load(session_id).await?;
        ctx.authorize_owner(&versioned.value)?;
        Ok(versioned.value)
    }

    async fn session_lock(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&session_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::store::{MemorySessionStore, StoreError};

    fn create_test_manager() -> SessionManager {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        SessionManager::new(store, Arc::new(RoundCatalog::standard()))
    }

    fn two_round_template() -> AssessmentTemplate {
        AssessmentTemplate::new("screen")
            .with_round(RoundId::Aptitude)
            .with_round(RoundId::Coding)
    }

    // ==================== Creation Tests ====================

    #[tokio::test]
    async fn create_session_persists_and_returns_session() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");

        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();

        assert_eq!(session.overall_status, OverallStatus::NotStarted);
        assert_eq!(
            manager
                .current_round(&ctx, session.session_id)
                .await
                .unwrap(),
            Some(RoundId::Aptitude)
        );
    }

    #[tokio::test]
    async fn create_session_with_invalid_template_fails() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");

        let result = manager
            .create_session(&ctx, &AssessmentTemplate::new("empty"))
            .await;

        assert!(matches!(
            result,
            Err(SkillpathError::Session(SessionError::InvalidTemplate(_)))
        ));
    }

    // ==================== Authorization Tests ====================

    #[tokio::test]
    async fn mutation_by_non_owner_is_forbidden() {
        let manager = create_test_manager();
        let owner = CallerContext::new("student-1");
        let intruder = CallerContext::new("student-2");
        let session = manager
            .create_session(&owner, &two_round_template())
            .await
            .unwrap();

        let result = manager
            .start_round(&intruder, session.session_id, RoundId::Aptitude)
            .await;

        assert!(matches!(
            result,
            Err(SkillpathError::Auth(AuthError::Forbidden { .. }))
        ));
        // Session untouched
        assert_eq!(
            manager
                .snapshot(&owner, session.session_id)
                .await
                .unwrap()
                .overall_status,
            OverallStatus::NotStarted
        );
    }

    #[tokio::test]
    async fn read_by_non_owner_is_forbidden() {
        let manager = create_test_manager();
        let owner = CallerContext::new("student-1");
        let intruder = CallerContext::new("student-2");
        let session = manager
            .create_session(&owner, &two_round_template())
            .await
            .unwrap();

        let result = manager.weakness_map(&intruder, session.session_id).await;

        assert!(matches!(result, Err(SkillpathError::Auth(_))));
    }

    // ==================== Flow Tests ====================

    #[tokio::test]
    async fn start_and_submit_advance_the_session() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");
        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();
        let id = session.session_id;

        manager
            .start_round(&ctx, id, RoundId::Aptitude)
            .await
            .unwrap();
        manager
            .submit_round(&ctx, id, RoundId::Aptitude, RoundResult::new(0.9))
            .await
            .unwrap();

        assert_eq!(
            manager.current_round(&ctx, id).await.unwrap(),
            Some(RoundId::Coding)
        );
    }

    #[tokio::test]
    async fn operations_on_unknown_session_fail_not_found() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");

        let result = manager
            .start_round(&ctx, SessionId::new(), RoundId::Aptitude)
            .await;

        assert!(matches!(
            result,
            Err(SkillpathError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn abandon_blocks_later_mutations() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");
        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();
        let id = session.session_id;

        manager.abandon_session(&ctx, id).await.unwrap();

        let result = manager.start_round(&ctx, id, RoundId::Aptitude).await;
        assert!(matches!(
            result,
            Err(SkillpathError::Session(SessionError::SessionTerminal { .. }))
        ));
    }

    // ==================== Snapshot Tests ====================

    #[tokio::test]
    async fn snapshot_projects_rounds_in_plan_order() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");
        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();
        let id = session.session_id;

        manager
            .start_round(&ctx, id, RoundId::Aptitude)
            .await
            .unwrap();
        manager
            .submit_round(&ctx, id, RoundId::Aptitude, RoundResult::new(0.8))
            .await
            .unwrap();

        let snapshot = manager.snapshot(&ctx, id).await.unwrap();

        assert_eq!(snapshot.session_id, id);
        assert_eq!(snapshot.overall_status, OverallStatus::InProgress);
        assert_eq!(snapshot.current_round, Some(RoundId::Coding));
        assert_eq!(snapshot.rounds.len(), 2);
        assert_eq!(snapshot.rounds[0].id, RoundId::Aptitude);
        assert_eq!(snapshot.rounds[0].status, RoundStatus::Completed);
        assert_eq!(snapshot.rounds[0].score, Some(0.8));
        assert_eq!(snapshot.rounds[1].status, RoundStatus::Pending);
        assert_eq!(snapshot.overall_score, Some(0.8));
    }

    #[tokio::test]
    async fn snapshot_has_no_score_before_any_completion() {
        let manager = create_test_manager();
        let ctx = CallerContext::new("student-1");
        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();

        let snapshot = manager.snapshot(&ctx, session.session_id).await.unwrap();

        assert_eq!(snapshot.overall_score, None);
        assert!(snapshot.completed_at.is_none());
    }

    // ==================== Concurrency Tests ====================

    #[tokio::test]
    async fn concurrent_double_submission_applies_exactly_once() {
        let manager = Arc::new(create_test_manager());
        let ctx = CallerContext::new("student-1");
        let session = manager
            .create_session(&ctx, &two_round_template())
            .await
            .unwrap();
        let id = session.session_id;
        manager
            .start_round(&ctx, id, RoundId::Aptitude)
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..2 {
            let manager = Arc::clone(&manager);
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                manager
                    .submit_round(&ctx, id, RoundId::Aptitude, RoundResult::new(0.9))
                    .await
            }));
        }

        let mut ok = 0;
        let mut not_in_progress = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(SkillpathError::Session(SessionError::NotInProgress(_))) => {
                    not_in_progress += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(not_in_progress, 1);
        assert_eq!(
            manager
                .snapshot(&ctx, id)
                .await
                .unwrap()
                .rounds[0]
                .score,
            Some(0.9)
        );
    }
}

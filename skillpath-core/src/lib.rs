//! skillpath-core: Core library for the skillpath assessment platform
//!
//! This crate provides the foundational components for skillpath:
//!
//! - **Round catalog** - [`RoundCatalog`] describing the assessment rounds the platform offers
//! - **Templates** - [`AssessmentTemplate`] picking and ordering rounds for a screening
//! - **Session lifecycle** - [`AssessmentSession`] state machine and [`SessionManager`]
//! - **Scoring** - weighted rollup and per-topic [`WeaknessMap`] derivation
//! - **Storage contract** - [`SessionStore`] trait and [`MemorySessionStore`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use skillpath_core::{
//!     AssessmentTemplate, CallerContext, MemorySessionStore, RoundCatalog, RoundId,
//!     RoundResult, SessionManager,
//! };
//!
//! # async fn example() -> Result<(), skillpath_core::SkillpathError> {
//! let manager = SessionManager::new(
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(RoundCatalog::standard()),
//! );
//!
//! let template = AssessmentTemplate::new("backend-screen")
//!     .with_round(RoundId::Aptitude)
//!     .with_round(RoundId::Coding);
//!
//! let ctx = CallerContext::new("student-42");
//! let session = manager.create_session(&ctx, &template).await?;
//!
//! manager.start_round(&ctx, session.session_id, RoundId::Aptitude).await?;
//! manager
//!     .submit_round(&ctx, session.session_id, RoundId::Aptitude, RoundResult::new(0.85))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod error;
pub mod scoring;
pub mod session;
pub mod store;
pub mod template;

// Re-export key types for convenience
pub use auth::CallerContext;
pub use catalog::{RoundCatalog, RoundCategory, RoundDefinition, RoundId};
pub use error::{
    AuthError, CatalogError, ConfigError, ScoringError, SessionError, SkillpathError,
};
pub use scoring::{EmptyScorePolicy, ScoringConfig, WeaknessMap, overall_score, weakness_map};
pub use session::{
    AssessmentSession, OverallStatus, PlanEntry, RoundResult, RoundSnapshot, RoundState,
    RoundStatus, SessionId, SessionManager, SessionSnapshot, StudentId,
};
pub use store::{MemorySessionStore, SessionStore, StoreError, Versioned};
pub use template::{AssessmentTemplate, TemplateRound};

//! Assessment session state machine
//!
//! An [`AssessmentSession`] tracks one student's pass through an ordered
//! plan of rounds. Rounds are attempted strictly in plan order; the session
//! completes when every round is terminal, and `abandoned` is an absorbing
//! alternative to completion.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{RoundCatalog, RoundId};
use crate::error::SessionError;
use crate::template::AssessmentTemplate;

/// Identity of the student who owns a session.
pub type StudentId = String;

/// Unique identifier for an assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new session ID with a UUIDv7 (time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of one round within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Not yet reachable or not yet started
    Pending,
    /// Attempt is open
    InProgress,
    /// Submitted with a score
    Completed,
    /// Skipped under an explicit per-round policy flag
    Skipped,
}

impl RoundStatus {
    /// Convert to the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Parse from the string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Completed and skipped rounds accept no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// Status of the session as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Created, no round started yet
    NotStarted,
    /// At least one round started
    InProgress,
    /// Every round in the plan is terminal
    Completed,
    /// Explicitly abandoned (terminal)
    Abandoned,
}

impl OverallStatus {
    /// Convert to the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Parse from the string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    /// Completed and abandoned sessions accept no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-round state within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Current status
    pub status: RoundStatus,
    /// Number of times the round was started
    pub attempt_count: u32,
    /// Final score, present only when completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Per-topic normalized scores in `[0, 1]`, present only for round
    /// types with topic granularity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_breakdown: Option<HashMap<String, f64>>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            status: RoundStatus::Pending,
            attempt_count: 0,
            score: None,
            topic_breakdown: None,
        }
    }
}

/// Submission payload for a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Overall score for the round
    pub score: f64,
    /// Optional per-topic normalized scores; ignored for round types
    /// without topic granularity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_breakdown: Option<HashMap<String, f64>>,
}

impl RoundResult {
    /// Create a result carrying only an overall score.
    #[must_use]
    pub fn new(score: f64) -> Self {
        Self {
            score,
            topic_breakdown: None,
        }
    }

    /// Attach a per-topic score breakdown.
    #[must_use]
    pub fn with_topic_breakdown(mut self, breakdown: HashMap<String, f64>) -> Self {
        self.topic_breakdown = Some(breakdown);
        self
    }
}

/// One round in the session's plan, with its policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Round identifier
    pub id: RoundId,
    /// Whether this round may be skipped instead of attempted
    #[serde(default)]
    pub skippable: bool,
}

/// One student's attempt at an assessment template.
///
/// The plan is fixed at creation. All transitions are guarded so the plan
/// order and completion invariants hold at every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    /// Unique identifier, assigned at creation, never reused
    pub session_id: SessionId,
    /// Owning student
    pub student_id: StudentId,
    /// Ordered round plan, immutable once the session exists
    pub plan: Vec<PlanEntry>,
    /// Per-round state, one entry per plan round
    pub round_states: HashMap<RoundId, RoundState>,
    /// Session-level status
    pub overall_status: OverallStatus,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session completed (None until then)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    /// Create a new session from a template.
    ///
    /// Every round starts `pending` and the session starts `not_started`.
    /// Fails with [`SessionError::InvalidTemplate`] if the template is
    /// empty, repeats a round, or references a round missing from the
    /// catalog.
    pub fn new(
        student_id: impl Into<StudentId>,
        template: &AssessmentTemplate,
        catalog: &RoundCatalog,
    ) -> Result<Self, SessionError> {
        template.validate(catalog)?;

        let plan: Vec<PlanEntry> = template
            .rounds
            .iter()
            .map(|round| PlanEntry {
                id: round.id,
                skippable: round.skippable,
            })
            .collect();
        let round_states = plan
            .iter()
            .map(|entry| (entry.id, RoundState::default()))
            .collect();

        Ok(Self {
            session_id: SessionId::new(),
            student_id: student_id.into(),
            plan,
            round_states,
            overall_status: OverallStatus::NotStarted,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    /// The first round in plan order that is still `pending` or
    /// `in_progress`, or `None` when every round is terminal.
    #[must_use]
    pub fn current_round(&self) -> Option<RoundId> {
        self.plan
            .iter()
            .find(|entry| {
                self.round_states
                    .get(&entry.id)
                    .is_some_and(|state| !state.status.is_terminal())
            })
            .map(|entry| entry.id)
    }

    /// Start (or re-start) the current round.
    ///
    /// Only the round returned by [`current_round`](Self::current_round)
    /// may be started; anything else fails with `OutOfSequence`. Each
    /// start increments the round's attempt count, so resuming after an
    /// interruption counts as a fresh attempt.
    pub fn start_round(&mut self, round_id: RoundId) -> Result<(), SessionError> {
        self.ensure_active()?;

        let current = self.current_round();
        if current != Some(round_id) {
            return Err(SessionError::OutOfSequence {
                requested: round_id,
                current,
            });
        }

        let Some(state) = self.round_states.get_mut(&round_id) else {
            return Err(SessionError::OutOfSequence {
                requested: round_id,
                current,
            });
        };
        state.status = RoundStatus::InProgress;
        state.attempt_count += 1;

        if self.overall_status == OverallStatus::NotStarted {
            self.overall_status = OverallStatus::InProgress;
        }
        Ok(())
    }

    /// Submit a result for an in-progress round.
    ///
    /// Stores the score (and the topic breakdown, for round types that
    /// have one), marks the round completed, and flips the session to
    /// `completed` when every round is terminal.
    pub fn submit_round(
        &mut self,
        round_id: RoundId,
        result: RoundResult,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;

        let Some(state) = self.round_states.get_mut(&round_id) else {
            return Err(SessionError::NotInProgress(round_id));
        };
        if state.status != RoundStatus::InProgress {
            return Err(SessionError::NotInProgress(round_id));
        }

        state.status = RoundStatus::Completed;
        state.score = Some(result.score);
        state.topic_breakdown = if round_id.has_topic_breakdown() {
            result.topic_breakdown
        } else {
            None
        };

        self.refresh_completion();
        Ok(())
    }

    /// Skip the current round.
    ///
    /// Permitted only when the plan flags the round skippable and the
    /// round is the pending current round. A skipped round carries no
    /// score and is excluded from rollup.
    pub fn skip_round(&mut self, round_id: RoundId) -> Result<(), SessionError> {
        self.ensure_active()?;

        let skippable = self
            .plan
            .iter()
            .find(|entry| entry.id == round_id)
            .is_some_and(|entry| entry.skippable);
        let is_current = self.current_round() == Some(round_id);

        let Some(state) = self.round_states.get_mut(&round_id) else {
            return Err(SessionError::SkipNotAllowed(round_id));
        };
        if !skippable || !is_current || state.status != RoundStatus::Pending {
            return Err(SessionError::SkipNotAllowed(round_id));
        }

        state.status = RoundStatus::Skipped;
        self.refresh_completion();
        Ok(())
    }

    /// Abandon the session.
    ///
    /// Allowed from any non-terminal status; abandoned is absorbing.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.overall_status = OverallStatus::Abandoned;
        Ok(())
    }

    /// State of one round, if it is part of the plan.
    #[must_use]
    pub fn round_state(&self, round_id: RoundId) -> Option<&RoundState> {
        self.round_states.get(&round_id)
    }

    /// Whether the session accepts no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.overall_status.is_terminal()
    }

    /// Completed rounds in plan order, with their states.
    pub fn completed_rounds(&self) -> impl Iterator<Item = (RoundId, &RoundState)> {
        self.plan.iter().filter_map(|entry| {
            self.round_states
                .get(&entry.id)
                .filter(|state| state.status == RoundStatus::Completed)
                .map(|state| (entry.id, state))
        })
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.overall_status.is_terminal() {
            return Err(SessionError::SessionTerminal {
                status: self.overall_status,
            });
        }
        Ok(())
    }

    fn refresh_completion(&mut self) {
        let all_terminal = self.plan.iter().all(|entry| {
            self.round_states
                .get(&entry.id)
                .is_some_and(|state| state.status.is_terminal())
        });
        if all_terminal {
            self.overall_status = OverallStatus::Completed;
            self.completed_at = Some(Utc::now());
        }
    }
}

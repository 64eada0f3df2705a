//! Assessment session state machine and lifecycle management
//!
//! [`AssessmentSession`] holds the pure state machine: a plan of rounds
//! derived from a template, per-round state, and the transitions between
//! them. [`SessionManager`] layers persistence, ownership checks, and
//! per-session write serialization on top.

mod manager;
mod state;

pub use manager::{RoundSnapshot, SessionManager, SessionSnapshot};
pub use state::{
    AssessmentSession, OverallStatus, PlanEntry, RoundResult, RoundState, RoundStatus, SessionId,
    StudentId,
};

//! Error types for skillpath-core

use thiserror::Error;

use crate::catalog::RoundId;
use crate::session::{OverallStatus, SessionId, StudentId};
use crate::store::StoreError;

/// Top-level error type for skillpath-core
#[derive(Error, Debug)]
pub enum SkillpathError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the round catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown round: {0}")]
    UnknownRound(RoundId),
}

/// Errors related to the session state machine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Round {requested} is out of sequence; current round is {current:?}")]
    OutOfSequence {
        requested: RoundId,
        current: Option<RoundId>,
    },

    #[error("Round {0} is not in progress")]
    NotInProgress(RoundId),

    #[error("Round {0} may not be skipped")]
    SkipNotAllowed(RoundId),

    #[error("Session is terminal ({status})")]
    SessionTerminal { status: OverallStatus },
}

/// Errors from score rollup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("No completed rounds to score")]
    NoCompletedRounds,
}

/// Authorization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Caller {caller} does not own session {session}")]
    Forbidden {
        caller: StudentId,
        session: SessionId,
    },
}

/// Errors while loading configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

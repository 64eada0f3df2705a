//! Caller context and ownership checks
//!
//! The surrounding platform authenticates the caller; the core only sees
//! an explicit [`CallerContext`] passed into every operation. There is no
//! ambient identity state.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::session::{AssessmentSession, StudentId};

/// Identity of the caller performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    /// The authenticated student
    pub student_id: StudentId,
}

impl CallerContext {
    /// Create a context for the given student.
    pub fn new(student_id: impl Into<StudentId>) -> Self {
        Self {
            student_id: student_id.into(),
        }
    }

    /// Check that the caller owns the session.
    ///
    /// Every session operation, mutating or read-only, runs this check
    /// first; failures are not retried.
    pub fn authorize_owner(&self, session: &AssessmentSession) -> Result<(), AuthError> {
        if session.student_id != self.student_id {
            return Err(AuthError::Forbidden {
                caller: self.student_id.clone(),
                session: session.session_id,
            });
        }
        Ok(())
    }
}

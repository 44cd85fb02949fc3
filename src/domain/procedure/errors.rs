//! Decision-computation errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Why a decision could not be computed.
///
/// None of these block a ballot from closing; the ballot ends without a
/// decision and the error is handed back for manual resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("invalid procedure: {0}")]
    InvalidProcedure(String),

    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    #[error("inconsistent tally: {votes_cast} votes cast but only {participants} participants")]
    InconsistentTally { votes_cast: u32, participants: u32 },
}

impl EvaluationError {
    pub fn invalid_procedure(reason: impl Into<String>) -> Self {
        EvaluationError::InvalidProcedure(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        EvaluationError::MalformedExpression(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EvaluationError::InvalidProcedure(_) => ErrorCode::InvalidProcedure,
            EvaluationError::MalformedExpression(_) => ErrorCode::MalformedExpression,
            EvaluationError::InconsistentTally { .. } => ErrorCode::InconsistentTally,
        }
    }
}

impl From<EvaluationError> for DomainError {
    fn from(err: EvaluationError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

//! Ballot-specific error types.
//!
//! This is the taxonomy every vote command reports. `code()` lets a
//! transport layer map each variant onto its own status vocabulary
//! (validation → 4xx, not found → 404, state → 409, infrastructure → 5xx).

use thiserror::Error;

use crate::domain::foundation::{
    AgendaItemId, BallotId, DomainError, ErrorCode, MeetingId, ProcedureId, UserId,
    ValidationError,
};
use crate::domain::procedure::EvaluationError;

/// Errors returned by vote commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BallotError {
    /// Malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ballot not found: {0}")]
    BallotNotFound(BallotId),

    #[error("Agenda item not found: {0}")]
    AgendaItemNotFound(AgendaItemId),

    #[error("Meeting not found: {0}")]
    MeetingNotFound(MeetingId),

    #[error("Procedure not found: {0}")]
    ProcedureNotFound(ProcedureId),

    /// Another ballot on the same agenda item is still PENDING or ENDED.
    #[error("Agenda item {agenda_item_id} already has an open ballot {ballot_id}")]
    VoteAlreadyActive {
        agenda_item_id: AgendaItemId,
        ballot_id: BallotId,
    },

    /// Transition attempted from the wrong status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// Voter is not in the ballot's current cohort.
    #[error("User {0} is not eligible to vote on this ballot")]
    VoterNotEligible(UserId),

    /// The decision could not be computed.
    #[error("Decision unavailable: {0}")]
    Decision(EvaluationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl BallotError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        BallotError::InvalidInput(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        BallotError::InvalidState(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BallotError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BallotError::InvalidInput(_) => ErrorCode::ValidationFailed,
            BallotError::BallotNotFound(_) => ErrorCode::BallotNotFound,
            BallotError::AgendaItemNotFound(_) => ErrorCode::AgendaItemNotFound,
            BallotError::MeetingNotFound(_) => ErrorCode::MeetingNotFound,
            BallotError::ProcedureNotFound(_) => ErrorCode::ProcedureNotFound,
            BallotError::VoteAlreadyActive { .. } => ErrorCode::VoteAlreadyActive,
            BallotError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            BallotError::InvalidChoice(_) => ErrorCode::InvalidChoice,
            BallotError::VoterNotEligible(_) => ErrorCode::VoterNotEligible,
            BallotError::Decision(e) => e.code(),
            BallotError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True for the request-shape class (4xx-equivalent).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BallotError::InvalidInput(_)
                | BallotError::InvalidChoice(_)
                | BallotError::VoterNotEligible(_)
        )
    }

    /// True for the missing-entity class (404-equivalent).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BallotError::BallotNotFound(_)
                | BallotError::AgendaItemNotFound(_)
                | BallotError::MeetingNotFound(_)
                | BallotError::ProcedureNotFound(_)
        )
    }
}

impl From<ValidationError> for BallotError {
    fn from(err: ValidationError) -> Self {
        BallotError::InvalidInput(err.to_string())
    }
}

impl From<EvaluationError> for BallotError {
    fn from(err: EvaluationError) -> Self {
        BallotError::Decision(err)
    }
}

impl From<DomainError> for BallotError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => BallotError::InvalidState(err.message),
            ErrorCode::ValidationFailed => BallotError::InvalidInput(err.message),
            ErrorCode::InvalidChoice => BallotError::InvalidChoice(err.message),
            _ => BallotError::Infrastructure(err.to_string()),
        }
    }
}

//! Meeting-specific error types.

use thiserror::Error;

use crate::domain::foundation::{AgendaItemId, DomainError, ErrorCode, MeetingId, UserId};

/// Errors returned by meeting and participant status commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(MeetingId),

    #[error("Agenda item not found: {0}")]
    AgendaItemNotFound(AgendaItemId),

    #[error("Agenda item {agenda_item_id} does not belong to meeting {meeting_id}")]
    ForeignAgendaItem {
        meeting_id: MeetingId,
        agenda_item_id: AgendaItemId,
    },

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl MeetingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MeetingError::MeetingNotFound(_) => ErrorCode::MeetingNotFound,
            MeetingError::AgendaItemNotFound(_) => ErrorCode::AgendaItemNotFound,
            MeetingError::ForeignAgendaItem { .. } => ErrorCode::ValidationFailed,
            MeetingError::UserNotFound(_) => ErrorCode::UserNotFound,
            MeetingError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            MeetingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for MeetingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => MeetingError::InvalidState(err.message),
            _ => MeetingError::Infrastructure(err.to_string()),
        }
    }
}

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and event plumbing
//! that form the vocabulary of the voting domain.

mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::{CommandMetadata, TIMER_SOURCE};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{AgendaItemId, BallotId, CastId, DivisionId, MeetingId, ProcedureId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

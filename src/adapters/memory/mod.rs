//! In-memory store adapters.
//!
//! Stand-ins for the external relational store and participant directory,
//! used by tests and by the standalone binary.

mod ballot_store;
mod meeting_store;
mod participant_directory;

pub use ballot_store::InMemoryBallotStore;
pub use meeting_store::{InMemoryMeetingStore, InMemoryProcedureStore};
pub use participant_directory::InMemoryParticipantDirectory;

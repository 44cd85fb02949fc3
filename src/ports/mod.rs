//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the vote engine and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Publish lifecycle and status events
//! - `EventSubscriber` - Register handlers for published events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Store Ports
//!
//! - `BallotRepository` - Ballots and their casts
//! - `MeetingRepository` - Meetings and agenda items
//! - `ProcedureRepository` - Stored decision procedures
//! - `ParticipantDirectory` - Voting cohorts and participant status
//!
//! ## Scheduling
//!
//! - `CloseTimer` - Per-ballot cancellable auto-close

mod ballot_repository;
mod close_timer;
mod event_publisher;
mod event_subscriber;
mod meeting_repository;
mod participant_directory;
mod procedure_repository;

pub use ballot_repository::BallotRepository;
pub use close_timer::CloseTimer;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use meeting_repository::MeetingRepository;
pub use participant_directory::ParticipantDirectory;
pub use procedure_repository::ProcedureRepository;

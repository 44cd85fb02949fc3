//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the vote engine to its collaborators:
//! - `events` - Event bus implementations (in-memory, broadcast, Redis)
//! - `memory` - In-memory stores and participant directory
//! - `timer` - Tokio close timer

pub mod events;
pub mod memory;
pub mod timer;

pub use events::{BroadcastEventBus, InMemoryEventBus, RedisEventPublisher, ALL_EVENTS};
pub use memory::{
    InMemoryBallotStore, InMemoryMeetingStore, InMemoryParticipantDirectory,
    InMemoryProcedureStore,
};
pub use timer::{ExpiredBallots, TokioCloseTimer};

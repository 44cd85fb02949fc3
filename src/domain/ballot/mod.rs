//! Ballot module - one timed voting round and its lifecycle.
//!
//! # Components
//!
//! - `Ballot` - aggregate holding counts, procedure copy and decision
//! - `BallotStatus` - PENDING → ENDED → APPLIED | CANCELLED
//! - `BallotError` - command error taxonomy
//! - Events: `VotePending`, `VoteEnded`, `VoteApplied`, `VoteCancelled`

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::{Ballot, VoteType, MAX_QUESTION_LENGTH};
pub use errors::BallotError;
pub use events::{VoteApplied, VoteCancelled, VoteEnded, VotePending};
pub use status::BallotStatus;

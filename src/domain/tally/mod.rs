//! Tally module - casts, cohorts and the recount that turns them into counts.
//!
//! # Components
//!
//! - `CastVote` / `Choice` - one participant's effective vote
//! - `Cohort` / `Participant` - eligible voters at a point in time
//! - `Tally` / `TallySnapshot` - counts, plus cohort figures for evaluation
//! - `TallyAggregator` - pure full-recount service

mod aggregator;
mod cast;
mod cohort;
mod snapshot;

pub use aggregator::TallyAggregator;
pub use cast::{CastVote, Choice};
pub use cohort::{Cohort, Participant};
pub use snapshot::{Tally, TallySnapshot};

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, errors, events, state machine)
//! - `procedure` - Decision procedures and the expression evaluator
//! - `tally` - Casts, cohorts and the full-recount aggregator
//! - `ballot` - Ballot aggregate, lifecycle status and events
//! - `meeting` - Meetings, agenda items and status events

pub mod ballot;
pub mod foundation;
pub mod meeting;
pub mod procedure;
pub mod tally;

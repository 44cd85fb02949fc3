//! Rollcall - Live roll-call voting engine
//!
//! Runs timed ballots on meeting agenda items: participants cast votes,
//! the tally is recounted against the current cohort, the ballot closes on
//! its timer or on an operator's command, and a decision procedure
//! expression turns the final counts into a decision. Every transition is
//! fanned out to live subscribers through the notification bus.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

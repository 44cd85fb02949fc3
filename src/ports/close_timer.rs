//! Close timer port.
//!
//! One cancellable timer per PENDING ballot. When a timer fires, the
//! adapter reports the ballot id on its expiry channel; the close worker
//! turns that into a close attempt. Firing after the ballot already closed
//! is harmless because the close itself is guarded on status.

use std::time::Duration;

use crate::domain::foundation::BallotId;

pub trait CloseTimer: Send + Sync {
    /// Schedules the ballot to close after `after`.
    ///
    /// Arming an already armed ballot replaces the earlier timer.
    fn arm(&self, ballot_id: BallotId, after: Duration);

    /// Cancels the ballot's timer. No-op if none is armed.
    fn disarm(&self, ballot_id: &BallotId);

    /// Number of timers currently armed.
    fn armed_count(&self) -> usize;
}

//! Tokio-backed close timer.
//!
//! Each armed ballot gets a spawned task that sleeps for the ballot's
//! duration and then reports the ballot id on the expiry channel. Disarming
//! aborts the task. The task never touches ballot state; the close worker
//! on the other end of the channel does, under the ballot lock.

use dashmap::DashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::foundation::BallotId;
use crate::ports::CloseTimer;

/// Receiving side of the expiry channel.
pub type ExpiredBallots = mpsc::UnboundedReceiver<BallotId>;

/// Cancellable per-ballot timers.
///
/// `arm` spawns onto the current tokio runtime and must be called from
/// within one.
pub struct TokioCloseTimer {
    tasks: DashMap<BallotId, JoinHandle<()>>,
    expired: mpsc::UnboundedSender<BallotId>,
}

impl TokioCloseTimer {
    /// Creates the timer and the receiver its expiries arrive on.
    pub fn new() -> (Self, ExpiredBallots) {
        let (expired, receiver) = mpsc::unbounded_channel();
        (
            Self {
                tasks: DashMap::new(),
                expired,
            },
            receiver,
        )
    }
}

impl CloseTimer for TokioCloseTimer {
    fn arm(&self, ballot_id: BallotId, after: Duration) {
        let expired = self.expired.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            tracing::debug!(ballot_id = %ballot_id, "close timer fired");
            if expired.send(ballot_id).is_err() {
                tracing::warn!(ballot_id = %ballot_id, "close timer fired with no close worker");
            }
        });

        if let Some(previous) = self.tasks.insert(ballot_id, handle) {
            previous.abort();
        }
        tracing::debug!(ballot_id = %ballot_id, after_secs = after.as_secs(), "close timer armed");
    }

    fn disarm(&self, ballot_id: &BallotId) {
        if let Some((_, handle)) = self.tasks.remove(ballot_id) {
            handle.abort();
            tracing::debug!(ballot_id = %ballot_id, "close timer disarmed");
        }
    }

    fn armed_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for TokioCloseTimer {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
    }
}

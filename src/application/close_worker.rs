//! Close worker - turns timer expiries into EndVote calls.
//!
//! The timer only reports which ballot expired; this worker runs the close
//! through `EndVoteHandler::close_expired`, so the timer path takes the
//! same ballot lock and status check as a manual end. Closes for different
//! ballots run concurrently.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;

use crate::adapters::ExpiredBallots;

use super::handlers::EndVoteHandler;

pub struct CloseWorker {
    handler: Arc<EndVoteHandler>,
    expired: ExpiredBallots,
}

impl CloseWorker {
    pub fn new(handler: Arc<EndVoteHandler>, expired: ExpiredBallots) -> Self {
        Self { handler, expired }
    }

    /// Runs until shutdown is signalled or the timer is dropped.
    ///
    /// Closes already in flight are finished before returning; expiries
    /// still queued are left to the next start.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut in_flight = FuturesUnordered::new();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                received = self.expired.recv() => match received {
                    Some(ballot_id) => {
                        let handler = Arc::clone(&self.handler);
                        in_flight.push(async move { handler.close_expired(ballot_id).await });
                    }
                    None => break,
                },

                Some(_) = in_flight.next(), if !in_flight.is_empty() => {}
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            tracing::info!(pending, "finishing in-flight closes before shutdown");
        }
        while in_flight.next().await.is_some() {}
        tracing::debug!("close worker stopped");
    }
}

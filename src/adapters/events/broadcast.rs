//! Broadcast event bus - live in-process fan-out over `tokio::sync::broadcast`.
//!
//! # Architecture
//!
//! ```text
//!                       ┌──> receiver ──> task ──> ScreenUpdater
//! publish ──> Sender ───┼──> receiver ──> task ──> ConsoleHandler
//!                       └──> receiver (raw, e.g. a websocket bridge)
//! ```
//!
//! `publish` never waits on subscribers. A subscriber that falls more than
//! `capacity` events behind loses the oldest ones (logged as lag) and must
//! re-query state; nothing is replayed.

use async_trait::async_trait;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

use super::ALL_EVENTS;

/// Non-blocking, at-most-once in-process event bus.
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastEventBus {
    /// Create a bus whose subscribers may lag by up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Raw receiver of every event published from now on.
    pub fn receiver(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Number of live receivers, handler tasks included.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn spawn_listener(&self, event_types: Vec<String>, handler: Arc<dyn EventHandler>) {
        let mut receiver = self.sender.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let wanted = event_types
                            .iter()
                            .any(|t| t == ALL_EVENTS || *t == event.event_type);
                        if !wanted {
                            continue;
                        }
                        let event_type = event.event_type.clone();
                        if let Err(e) = handler.handle(event).await {
                            tracing::warn!(
                                handler = handler.name(),
                                event_type = %event_type,
                                error = %e,
                                "event handler failed"
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            handler = handler.name(),
                            skipped,
                            "subscriber lagged, events dropped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!(handler = handler.name(), "subscriber stopped");
        });
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        // No receivers is not an error: nobody is watching yet.
        if self.sender.send(event).is_err() {
            tracing::debug!("event published with no subscribers");
        }
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

/// Each subscription spawns a listener task, so these must be called from
/// within a tokio runtime.
impl EventSubscriber for BroadcastEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.spawn_listener(vec![event_type.to_string()], handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let event_types = event_types.iter().map(|t| t.to_string()).collect();
        self.spawn_listener(event_types, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, "b-1", "Ballot", json!({}))
    }

    struct Forwarder {
        tx: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl EventHandler for Forwarder {
        async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
            let _ = self.tx.send(event.event_type);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Forwarder"
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus = BroadcastEventBus::new(8);
        assert!(bus.publish(envelope("vote.pending")).await.is_ok());
    }

    #[tokio::test]
    async fn raw_receivers_see_events_in_publish_order() {
        let bus = BroadcastEventBus::new(8);
        let mut rx = bus.receiver();

        bus.publish(envelope("vote.pending")).await.unwrap();
        bus.publish(envelope("vote.ended")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, "vote.pending");
        assert_eq!(rx.recv().await.unwrap().event_type, "vote.ended");
    }

    #[tokio::test]
    async fn handler_receives_only_subscribed_topics() {
        let bus = BroadcastEventBus::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        bus.subscribe("vote.ended", Arc::new(Forwarder { tx }));

        bus.publish(envelope("vote.pending")).await.unwrap();
        bus.publish(envelope("vote.ended")).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, "vote.ended");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn lagging_receiver_drops_oldest() {
        let bus = BroadcastEventBus::new(2);
        let mut rx = bus.receiver();

        for _ in 0..4 {
            bus.publish(envelope("vote.pending")).await.unwrap();
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        assert!(rx.recv().await.is_ok());
    }
}

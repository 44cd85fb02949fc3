//! EventPublisher port - Interface for publishing domain events.
//!
//! This port defines how the vote engine publishes lifecycle and status
//! events without knowing about the transport (in-process channel, Redis).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Delivery is at-most-once; nothing is persisted or replayed
/// - Events from one publisher arrive in publish order
/// - `publish` does not wait on slow subscribers
///
/// A failed publish is reported to the caller, which logs it and keeps the
/// state transition that produced the event.
///
/// # Example
///
/// ```ignore
/// let envelope = VoteEnded::new(&ballot).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Stops at the first failure; earlier events stay delivered.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_publisher_is_object_safe() {
        fn _accepts_dyn(_publisher: &dyn EventPublisher) {}
    }
}

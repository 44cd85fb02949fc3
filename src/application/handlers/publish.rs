//! Best-effort event publication.
//!
//! Handlers publish only after the state change is committed. A failed
//! publish is logged and swallowed: the transition stands, and it is never
//! retried by re-running the transition.

use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent};
use crate::ports::EventPublisher;

pub(crate) async fn publish_event<E: SerializableDomainEvent>(
    publisher: &dyn EventPublisher,
    event: &E,
    metadata: &CommandMetadata,
) {
    let envelope = match event.to_envelope() {
        Ok(envelope) => metadata.stamp(envelope),
        Err(e) => {
            tracing::warn!(
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                error = %e,
                "failed to serialize event"
            );
            return;
        }
    };

    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id(),
            error = %e,
            "event publish failed, transition kept"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEventBus;
    use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, MeetingId, Timestamp, EventId};
    use crate::domain::meeting::{MeetingStatus, MeetingStatusChanged};
    use async_trait::async_trait;

    struct BrokenPublisher;

    #[async_trait]
    impl EventPublisher for BrokenPublisher {
        async fn publish(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::PublishFailed, "broker down"))
        }

        async fn publish_all(&self, _events: Vec<EventEnvelope>) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::PublishFailed, "broker down"))
        }
    }

    fn event() -> MeetingStatusChanged {
        MeetingStatusChanged {
            event_id: EventId::new(),
            meeting_id: MeetingId::new(),
            old_status: MeetingStatus::Waiting,
            new_status: MeetingStatus::Active,
            changed_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn stamps_metadata_onto_envelope() {
        let bus = InMemoryEventBus::new();

        publish_event(&bus, &event(), &CommandMetadata::test_fixture()).await;

        let published = bus.published_events();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].metadata.correlation_id.as_deref(),
            Some("test-correlation-id")
        );
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        publish_event(&BrokenPublisher, &event(), &CommandMetadata::test_fixture()).await;
    }
}

//! Redis publisher for cross-process fan-out.
//!
//! The process that mutates ballots publishes each envelope as JSON with
//! Redis `PUBLISH`; the processes serving client connections subscribe to
//! the channels they need. Redis pub/sub is itself at-most-once with no
//! replay, which matches the bus contract.
//!
//! Channel per event type: `{prefix}:{event_type}`, e.g. `rollcall:vote.ended`.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes envelopes to Redis pub/sub channels.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel_prefix: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            channel_prefix: channel_prefix.into(),
        }
    }

    /// Opens a multiplexed connection and wraps it.
    ///
    /// # Errors
    ///
    /// - `PublishFailed` if the URL is invalid or Redis is unreachable
    pub async fn connect(url: &str, channel_prefix: impl Into<String>) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(publish_error)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(publish_error)?;
        Ok(Self::new(conn, channel_prefix))
    }

    /// Channel an event type is published on.
    pub fn channel_for(&self, event_type: &str) -> String {
        channel_name(&self.channel_prefix, event_type)
    }
}

fn channel_name(prefix: &str, event_type: &str) -> String {
    format!("{}:{}", prefix, event_type)
}

fn publish_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::PublishFailed, format!("Redis publish failed: {}", e))
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let channel = self.channel_for(&event.event_type);
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::PublishFailed,
                format!("Failed to serialize event: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(&channel, payload).await.map_err(publish_error)?;

        tracing::debug!(channel = %channel, receivers, "event published to redis");
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RedisEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventPublisher")
            .field("channel_prefix", &self.channel_prefix)
            .finish_non_exhaustive()
    }
}

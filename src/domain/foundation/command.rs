//! Command infrastructure for application handlers.
//!
//! `CommandMetadata` is the context that flows through command processing
//! and onto every published event: who issued the command, which request
//! it belongs to, and where it came from (operator console, timer, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EventEnvelope, UserId};

/// Source tag used for commands raised by the close timer.
pub const TIMER_SOURCE: &str = "timer";

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The user executing this command. `None` for system-originated commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Links related operations across a single request.
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,

    /// Source of this command (e.g., "api", "websocket", "timer").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates command metadata for an operator- or participant-issued command.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            correlation_id: None,
            source: None,
        }
    }

    /// Creates metadata for a command raised by the system itself.
    pub fn system(source: impl Into<String>) -> Self {
        Self {
            user_id: None,
            correlation_id: None,
            source: Some(source.into()),
        }
    }

    /// Builder: Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the correlation ID, generating one if not set.
    pub fn correlation_id(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Returns the source if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Copies this context onto an outgoing event envelope.
    pub fn stamp(&self, envelope: EventEnvelope) -> EventEnvelope {
        let mut envelope = envelope.with_correlation_id(self.correlation_id());
        if let Some(user_id) = &self.user_id {
            envelope = envelope.with_user_id(user_id.to_string());
        }
        if let Some(source) = &self.source {
            envelope = envelope.with_source(source.clone());
        }
        envelope
    }
}

#[cfg(test)]
impl CommandMetadata {
    /// Creates a test fixture with an operator user ID.
    pub fn test_fixture() -> Self {
        Self::new(UserId::new("operator-1").unwrap())
            .with_correlation_id("test-correlation-id")
            .with_source("test")
    }
}

//! EventSubscriber port - Interface for subscribing to domain events.
//!
//! Client sessions (control console, participant screens, public display)
//! register handlers here. A subscriber that joins late reconciles by
//! querying ballots directly; the bus never replays.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations should be:
/// - **Idempotent** - Safe to call multiple times with same event
/// - **Quick** - Long work belongs on a separate task
/// - **Isolated** - Errors don't affect other handlers
///
/// # Example
///
/// ```ignore
/// struct ScreenUpdater { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for ScreenUpdater {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let ended: VoteEnded = event.payload_as()?;
///         // Push the final counts to connected screens...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "ScreenUpdater"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe("vote.ended", screen_updater);
/// subscriber.subscribe_all(&["vote.pending", "vote.ended"], console);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    ///
    /// The same handler instance is invoked for any matching event type.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

//! Event bus adapters.
//!
//! Adapters implement the event publishing and subscribing ports
//! for different environments:
//!
//! - `InMemoryEventBus` - Synchronous, capturing bus for tests
//! - `BroadcastEventBus` - Non-blocking in-process fan-out
//! - `RedisEventPublisher` - Cross-process publish over Redis pub/sub

mod broadcast;
mod in_memory;
mod redis;

pub use self::broadcast::BroadcastEventBus;
pub use self::in_memory::{InMemoryEventBus, ALL_EVENTS};
pub use self::redis::RedisEventPublisher;

//! rollcall - standalone vote engine process.
//!
//! Loads configuration, installs logging and runs the engine over the
//! in-memory stores until Ctrl-C. Every event goes out on the in-process
//! broadcast bus; with a `redis` section configured it is also forwarded to
//! Redis for the processes serving client connections.
//!
//! This binary has no command transport and no data loading: the stores
//! start empty and nothing outside the process can reach the engine. It is
//! a wiring smoke check for configuration, logging and the Redis bridge.
//! Embedders drive `rollcall::application::VoteEngine` from their own
//! transport with their own store adapters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use rollcall::adapters::{
    BroadcastEventBus, InMemoryBallotStore, InMemoryMeetingStore, InMemoryParticipantDirectory,
    InMemoryProcedureStore, RedisEventPublisher, ALL_EVENTS,
};
use rollcall::application::{EnginePorts, VoteEngine};
use rollcall::config::{AppConfig, ServerConfig};
use rollcall::domain::foundation::{DomainError, EventEnvelope};
use rollcall::ports::{EventHandler, EventPublisher, EventSubscriber};

/// Writes every published event to the log.
struct EventLogger;

#[async_trait]
impl EventHandler for EventLogger {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            source = ?event.metadata.source,
            "event"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventLogger"
    }
}

/// Forwards in-process events to Redis.
struct RedisBridge {
    publisher: RedisEventPublisher,
}

#[async_trait]
impl EventHandler for RedisBridge {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.publisher.publish(event).await
    }

    fn name(&self) -> &'static str {
        "RedisBridge"
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_new(&server.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if server.json_logs() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    tracing::info!(environment = ?config.server.environment, "starting rollcall");

    // === Notification bus ===
    let bus = BroadcastEventBus::new(config.voting.bus_capacity);
    bus.subscribe(ALL_EVENTS, Arc::new(EventLogger));
    if let Some(redis) = &config.redis {
        let publisher = RedisEventPublisher::connect(&redis.url, redis.channel_prefix.clone()).await?;
        tracing::info!(channel_prefix = %redis.channel_prefix, "forwarding events to redis");
        bus.subscribe(ALL_EVENTS, Arc::new(RedisBridge { publisher }));
    }

    // === Engine over in-memory stores ===
    let ports = EnginePorts {
        ballots: Arc::new(InMemoryBallotStore::new()),
        meetings: Arc::new(InMemoryMeetingStore::new()),
        procedures: Arc::new(InMemoryProcedureStore::new()),
        directory: Arc::new(InMemoryParticipantDirectory::new()),
        publisher: Arc::new(bus.clone()),
    };
    let engine = VoteEngine::start(ports, config.voting.policy());
    tracing::info!("engine running over empty in-memory stores; no command transport attached");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    engine.shutdown().await;

    Ok(())
}

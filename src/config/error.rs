//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Ballot duration bounds must satisfy 1 <= min <= max (got {min}..={max})")]
    InvalidDurationBounds { min: u64, max: u64 },

    #[error("Event bus capacity must be at least 1")]
    InvalidBusCapacity,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Redis channel prefix must not be empty or contain ':'")]
    InvalidChannelPrefix,
}

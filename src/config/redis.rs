//! Redis configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Cross-process publisher settings. Present only when events must leave
/// the process.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Events go to `{channel_prefix}:{event_type}`
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,
}

impl RedisConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.channel_prefix.is_empty() || self.channel_prefix.contains(':') {
            return Err(ValidationError::InvalidChannelPrefix);
        }
        Ok(())
    }
}

fn default_channel_prefix() -> String {
    "rollcall".to_string()
}

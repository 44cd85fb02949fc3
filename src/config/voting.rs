//! Voting configuration

use serde::Deserialize;

use crate::application::VotingPolicy;

use super::error::ValidationError;

/// Ballot limits and notification bus sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Shortest ballot a chair may start, in seconds
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u64,

    /// Longest ballot a chair may start, in seconds
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,

    /// Question used when a ballot is started without one
    #[serde(default = "default_question")]
    pub default_question: String,

    /// Events a slow subscriber may fall behind before losing the oldest
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

impl VotingConfig {
    pub fn policy(&self) -> VotingPolicy {
        VotingPolicy {
            min_duration_secs: self.min_duration_secs,
            max_duration_secs: self.max_duration_secs,
            default_question: self.default_question.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_duration_secs == 0 || self.min_duration_secs > self.max_duration_secs {
            return Err(ValidationError::InvalidDurationBounds {
                min: self.min_duration_secs,
                max: self.max_duration_secs,
            });
        }
        if self.default_question.trim().is_empty() {
            return Err(ValidationError::MissingRequired("VOTING__DEFAULT_QUESTION"));
        }
        if self.bus_capacity == 0 {
            return Err(ValidationError::InvalidBusCapacity);
        }
        Ok(())
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
            default_question: default_question(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

fn default_min_duration() -> u64 {
    1
}

fn default_max_duration() -> u64 {
    3600
}

fn default_question() -> String {
    VotingPolicy::default().default_question
}

fn default_bus_capacity() -> usize {
    1024
}

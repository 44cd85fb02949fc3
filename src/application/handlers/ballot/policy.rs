//! Voting policy shared by the ballot handlers.

/// Limits and defaults applied to new ballots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingPolicy {
    /// Shortest allowed ballot, in seconds.
    pub min_duration_secs: u64,
    /// Longest allowed ballot, in seconds.
    pub max_duration_secs: u64,
    /// Question used when a start request leaves it blank.
    pub default_question: String,
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            min_duration_secs: 1,
            max_duration_secs: 3600,
            default_question: "Голосование по вопросу повестки".to_string(),
        }
    }
}

impl VotingPolicy {
    pub fn allows_duration(&self, duration_secs: u64) -> bool {
        duration_secs > 0
            && duration_secs >= self.min_duration_secs
            && duration_secs <= self.max_duration_secs
    }
}

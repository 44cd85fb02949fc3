//! BallotStatus enum for tracking the lifecycle of a voting round.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a ballot.
///
/// ```text
/// PENDING ──> ENDED ──> APPLIED
///    │          │
///    └──────────┴─────> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallotStatus {
    /// Open for casts; the close timer is armed.
    #[default]
    Pending,
    /// Counts frozen, decision computed (or left empty on evaluator failure).
    Ended,
    /// Decision recorded permanently.
    Applied,
    /// Discarded by the operator.
    Cancelled,
}

impl BallotStatus {
    /// Returns true if participants may still cast.
    pub fn accepts_casts(&self) -> bool {
        matches!(self, BallotStatus::Pending)
    }

    /// Returns true while the ballot blocks a new vote on its agenda item.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl StateMachine for BallotStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BallotStatus::*;
        match self {
            Pending => vec![Ended, Cancelled],
            Ended => vec![Applied, Cancelled],
            Applied | Cancelled => vec![],
        }
    }
}

impl fmt::Display for BallotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BallotStatus::Pending => "PENDING",
            BallotStatus::Ended => "ENDED",
            BallotStatus::Applied => "APPLIED",
            BallotStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(BallotStatus::default(), BallotStatus::Pending);
    }

    #[test]
    fn pending_can_end_or_cancel() {
        assert!(BallotStatus::Pending.can_transition_to(&BallotStatus::Ended));
        assert!(BallotStatus::Pending.can_transition_to(&BallotStatus::Cancelled));
        assert!(!BallotStatus::Pending.can_transition_to(&BallotStatus::Applied));
    }

    #[test]
    fn ended_never_returns_to_pending() {
        assert!(!BallotStatus::Ended.can_transition_to(&BallotStatus::Pending));
        assert!(BallotStatus::Ended.can_transition_to(&BallotStatus::Applied));
        assert!(BallotStatus::Ended.can_transition_to(&BallotStatus::Cancelled));
    }

    #[test]
    fn applied_and_cancelled_are_terminal() {
        assert!(BallotStatus::Applied.is_terminal());
        assert!(BallotStatus::Cancelled.is_terminal());
        assert!(!BallotStatus::Ended.is_terminal());
    }

    #[test]
    fn only_pending_accepts_casts() {
        assert!(BallotStatus::Pending.accepts_casts());
        assert!(!BallotStatus::Ended.accepts_casts());
        assert!(BallotStatus::Ended.is_open());
        assert!(!BallotStatus::Applied.is_open());
    }

    #[test]
    fn serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&BallotStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
        assert_eq!(format!("{}", BallotStatus::Ended), "ENDED");
    }

    #[test]
    fn invalid_transition_returns_error() {
        let result = BallotStatus::Applied.transition_to(BallotStatus::Pending);
        assert!(result.is_err());
    }
}

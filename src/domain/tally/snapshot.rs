//! Tally counts and the evaluation snapshot built from them.

use serde::{Deserialize, Serialize};

/// Per-choice counts of a ballot.
///
/// # Invariants
///
/// `for_count + against + abstain + absent == cohort size` whenever the
/// tally was produced by the `TallyAggregator`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    #[serde(rename = "for")]
    pub for_count: u32,
    pub against: u32,
    pub abstain: u32,
    pub absent: u32,
}

impl Tally {
    /// A fresh tally where every cohort member is still absent.
    pub fn all_absent(cohort_size: u32) -> Self {
        Self {
            absent: cohort_size,
            ..Self::default()
        }
    }

    /// Running "total votes cast" (for + against + abstain).
    pub fn votes_cast(&self) -> u32 {
        self.for_count + self.against + self.abstain
    }

    /// Sum of all four counters; equals the cohort size for a consistent tally.
    pub fn total(&self) -> u32 {
        self.votes_cast() + self.absent
    }
}

/// Everything an expression may refer to: the tally plus cohort figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallySnapshot {
    pub total_participants: u32,
    pub total_online: u32,
    #[serde(flatten)]
    pub tally: Tally,
}

impl TallySnapshot {
    pub fn new(total_participants: u32, total_online: u32, tally: Tally) -> Self {
        Self {
            total_participants,
            total_online,
            tally,
        }
    }

    pub fn votes_cast(&self) -> u32 {
        self.tally.votes_cast()
    }

    /// True when the stored counts cannot belong to this cohort.
    pub fn is_inconsistent(&self) -> bool {
        self.votes_cast() > self.total_participants
    }
}

//! Ballot lifecycle events.
//!
//! Every event carries the full ballot snapshot so a client can render
//! correct state from any single event without replaying history:
//! - `VotePending` - ballot opened, or counts changed while open
//! - `VoteEnded` - counts frozen and decision computed
//! - `VoteApplied` - decision made permanent
//! - `VoteCancelled` - ballot discarded

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, BallotId, EventId, Timestamp};
use crate::domain::procedure::DecisionLabel;

use super::Ballot;

// ════════════════════════════════════════════════════════════════════════════
// VotePending
// ════════════════════════════════════════════════════════════════════════════

/// Published when a ballot opens and after every accepted cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotePending {
    pub event_id: EventId,
    pub ballot_id: BallotId,
    pub ballot: Ballot,
    pub published_at: Timestamp,
}

impl VotePending {
    pub fn new(ballot: &Ballot) -> Self {
        Self {
            event_id: EventId::new(),
            ballot_id: ballot.id(),
            ballot: ballot.clone(),
            published_at: Timestamp::now(),
        }
    }
}

domain_event!(
    VotePending,
    event_type = "vote.pending",
    aggregate_id = ballot_id,
    aggregate_type = "Ballot",
    occurred_at = published_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// VoteEnded
// ════════════════════════════════════════════════════════════════════════════

/// Published once per ballot, when it leaves PENDING.
///
/// `decision` is `None` when no procedure was attached or the procedure
/// could not be evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteEnded {
    pub event_id: EventId,
    pub ballot_id: BallotId,
    pub ballot: Ballot,
    pub decision: Option<DecisionLabel>,
    pub ended_at: Timestamp,
}

impl VoteEnded {
    pub fn new(ballot: &Ballot) -> Self {
        Self {
            event_id: EventId::new(),
            ballot_id: ballot.id(),
            ballot: ballot.clone(),
            decision: ballot.decision(),
            ended_at: ballot.ended_at().copied().unwrap_or_else(Timestamp::now),
        }
    }
}

domain_event!(
    VoteEnded,
    event_type = "vote.ended",
    aggregate_id = ballot_id,
    aggregate_type = "Ballot",
    occurred_at = ended_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// VoteApplied
// ════════════════════════════════════════════════════════════════════════════

/// Published when an ended ballot's decision is recorded permanently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteApplied {
    pub event_id: EventId,
    pub ballot_id: BallotId,
    pub ballot: Ballot,
    pub applied_at: Timestamp,
}

impl VoteApplied {
    pub fn new(ballot: &Ballot) -> Self {
        Self {
            event_id: EventId::new(),
            ballot_id: ballot.id(),
            ballot: ballot.clone(),
            applied_at: Timestamp::now(),
        }
    }
}

domain_event!(
    VoteApplied,
    event_type = "vote.applied",
    aggregate_id = ballot_id,
    aggregate_type = "Ballot",
    occurred_at = applied_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// VoteCancelled
// ════════════════════════════════════════════════════════════════════════════

/// Published when a ballot is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteCancelled {
    pub event_id: EventId,
    pub ballot_id: BallotId,
    pub ballot: Ballot,
    pub cancelled_at: Timestamp,
}

impl VoteCancelled {
    pub fn new(ballot: &Ballot) -> Self {
        Self {
            event_id: EventId::new(),
            ballot_id: ballot.id(),
            ballot: ballot.clone(),
            cancelled_at: Timestamp::now(),
        }
    }
}

domain_event!(
    VoteCancelled,
    event_type = "vote.cancelled",
    aggregate_id = ballot_id,
    aggregate_type = "Ballot",
    occurred_at = cancelled_at,
    event_id = event_id
);

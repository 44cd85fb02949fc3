//! Cast votes and the choices a participant can make.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{BallotId, CastId, Timestamp, UserId, ValidationError};

/// A participant's choice on a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Choice {
    For,
    Against,
    Abstain,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::For, Choice::Against, Choice::Abstain];
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Choice::For => "FOR",
            Choice::Against => "AGAINST",
            Choice::Abstain => "ABSTAIN",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Choice {
    type Err = ValidationError;

    /// Accepts the wire names and the labels shown on participant screens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FOR" | "for" | "За" => Ok(Choice::For),
            "AGAINST" | "against" | "Против" => Ok(Choice::Against),
            "ABSTAIN" | "abstain" | "Воздержался" | "Воздержались" => Ok(Choice::Abstain),
            other => Err(ValidationError::invalid_format(
                "choice",
                format!("unknown choice '{}'", other),
            )),
        }
    }
}

/// One recorded cast. At most one is effective per (voter, ballot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVote {
    pub id: CastId,
    pub voter_id: UserId,
    pub ballot_id: BallotId,
    pub choice: Choice,
    pub cast_at: Timestamp,
}

impl CastVote {
    pub fn new(voter_id: UserId, ballot_id: BallotId, choice: Choice) -> Self {
        Self {
            id: CastId::new(),
            voter_id,
            ballot_id,
            choice,
            cast_at: Timestamp::now(),
        }
    }
}

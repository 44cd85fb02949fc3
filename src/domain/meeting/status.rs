//! Meeting and participant status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    /// Scheduled, not yet opened.
    #[default]
    Waiting,
    /// In session.
    Active,
    /// Closed for good.
    Completed,
}

impl StateMachine for MeetingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MeetingStatus::*;
        match self {
            Waiting => vec![Active],
            Active => vec![Waiting, Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MeetingStatus::Waiting => "WAITING",
            MeetingStatus::Active => "ACTIVE",
            MeetingStatus::Completed => "COMPLETED",
        };
        write!(f, "{}", s)
    }
}

/// Connection status of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Online,
    #[default]
    Offline,
}

impl UserStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, UserStatus::Online)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Online => write!(f, "ONLINE"),
            UserStatus::Offline => write!(f, "OFFLINE"),
        }
    }
}

//! The participant cohort of a ballot.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// An eligible (non-administrative) voter and their connection status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: UserId,
    pub online: bool,
}

impl Participant {
    pub fn new(user_id: UserId, online: bool) -> Self {
        Self { user_id, online }
    }
}

/// Eligible voters of a meeting at one point in time.
///
/// Always read fresh from the directory; never cached across start/close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    members: Vec<Participant>,
}

impl Cohort {
    /// Builds a cohort, dropping duplicate user entries.
    pub fn new(members: Vec<Participant>) -> Self {
        let mut unique: Vec<Participant> = Vec::with_capacity(members.len());
        for member in members {
            if !unique.iter().any(|p| p.user_id == member.user_id) {
                unique.push(member);
            }
        }
        Self { members: unique }
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn size(&self) -> u32 {
        self.members.len() as u32
    }

    pub fn online_count(&self) -> u32 {
        self.members.iter().filter(|p| p.online).count() as u32
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.members.iter().any(|p| &p.user_id == user_id)
    }
}

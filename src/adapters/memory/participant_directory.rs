//! In-memory participant directory.
//!
//! Users belong to one division; administrators never count toward a
//! cohort. Membership can change at any time, including mid-ballot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DivisionId, DomainError, ErrorCode, UserId};
use crate::domain::meeting::UserStatus;
use crate::domain::tally::{Cohort, Participant};
use crate::ports::ParticipantDirectory;

#[derive(Debug, Clone)]
struct DirectoryEntry {
    division_id: DivisionId,
    is_admin: bool,
    status: UserStatus,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipantDirectory {
    users: Arc<RwLock<HashMap<UserId, DirectoryEntry>>>,
}

impl InMemoryParticipantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_participant(&self, user_id: UserId, division_id: DivisionId) {
        self.insert(user_id, division_id, false).await;
    }

    pub async fn add_admin(&self, user_id: UserId, division_id: DivisionId) {
        self.insert(user_id, division_id, true).await;
    }

    /// Removes a user entirely; returns whether they existed.
    pub async fn remove(&self, user_id: &UserId) -> bool {
        self.users.write().await.remove(user_id).is_some()
    }

    pub async fn status_of(&self, user_id: &UserId) -> Option<UserStatus> {
        self.users.read().await.get(user_id).map(|e| e.status)
    }

    async fn insert(&self, user_id: UserId, division_id: DivisionId, is_admin: bool) {
        self.users.write().await.insert(
            user_id,
            DirectoryEntry {
                division_id,
                is_admin,
                status: UserStatus::Offline,
            },
        );
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryParticipantDirectory {
    async fn cohort(&self, division_ids: &[DivisionId]) -> Result<Cohort, DomainError> {
        let users = self.users.read().await;
        let members = users
            .iter()
            .filter(|(_, e)| !e.is_admin && division_ids.contains(&e.division_id))
            .map(|(id, e)| Participant::new(id.clone(), e.status.is_online()))
            .collect();
        Ok(Cohort::new(members))
    }

    async fn set_status(&self, user_id: &UserId, status: UserStatus) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let entry = users.get_mut(user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", user_id))
        })?;
        entry.status = status;
        Ok(())
    }
}

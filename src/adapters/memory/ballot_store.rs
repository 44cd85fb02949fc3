//! In-memory ballot and cast storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::ballot::Ballot;
use crate::domain::foundation::{AgendaItemId, BallotId, DomainError, ErrorCode, UserId};
use crate::domain::tally::CastVote;
use crate::ports::BallotRepository;

/// Ballots plus casts keyed by (ballot, voter).
#[derive(Debug, Clone, Default)]
pub struct InMemoryBallotStore {
    ballots: Arc<RwLock<HashMap<BallotId, Ballot>>>,
    casts: Arc<RwLock<HashMap<BallotId, HashMap<UserId, CastVote>>>>,
}

impl InMemoryBallotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ballot_count(&self) -> usize {
        self.ballots.read().await.len()
    }

    /// All ballots ever opened for an agenda item, any status.
    pub async fn ballots_for_agenda_item(&self, agenda_item_id: &AgendaItemId) -> Vec<Ballot> {
        let mut found: Vec<Ballot> = self
            .ballots
            .read()
            .await
            .values()
            .filter(|b| b.agenda_item_id() == *agenda_item_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| *b.created_at());
        found
    }
}

#[async_trait]
impl BallotRepository for InMemoryBallotStore {
    async fn save(&self, ballot: &Ballot) -> Result<(), DomainError> {
        self.ballots.write().await.insert(ballot.id(), ballot.clone());
        Ok(())
    }

    async fn update(&self, ballot: &Ballot) -> Result<(), DomainError> {
        let mut ballots = self.ballots.write().await;
        match ballots.get_mut(&ballot.id()) {
            Some(stored) => {
                *stored = ballot.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::BallotNotFound,
                format!("Ballot not found: {}", ballot.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &BallotId) -> Result<Option<Ballot>, DomainError> {
        Ok(self.ballots.read().await.get(id).cloned())
    }

    async fn find_open_by_agenda_item(
        &self,
        agenda_item_id: &AgendaItemId,
    ) -> Result<Option<Ballot>, DomainError> {
        Ok(self
            .ballots
            .read()
            .await
            .values()
            .find(|b| b.agenda_item_id() == *agenda_item_id && b.status().is_open())
            .cloned())
    }

    async fn upsert_cast(&self, cast: &CastVote) -> Result<(), DomainError> {
        self.casts
            .write()
            .await
            .entry(cast.ballot_id)
            .or_default()
            .insert(cast.voter_id.clone(), cast.clone());
        Ok(())
    }

    async fn casts_for(&self, ballot_id: &BallotId) -> Result<Vec<CastVote>, DomainError> {
        Ok(self
            .casts
            .read()
            .await
            .get(ballot_id)
            .map(|by_voter| by_voter.values().cloned().collect())
            .unwrap_or_default())
    }
}

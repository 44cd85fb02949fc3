//! Ballot repository port.
//!
//! Persists ballots and their casts. Casts are keyed by (voter, ballot):
//! storing a second cast for the same pair replaces the first.

use async_trait::async_trait;

use crate::domain::ballot::Ballot;
use crate::domain::foundation::{AgendaItemId, BallotId, DomainError};
use crate::domain::tally::CastVote;

/// Repository port for Ballot aggregates and their casts.
///
/// Callers serialize writes per ballot; implementations need not guard
/// against concurrent writers of the same ballot.
#[async_trait]
pub trait BallotRepository: Send + Sync {
    /// Save a new ballot.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, ballot: &Ballot) -> Result<(), DomainError>;

    /// Update an existing ballot.
    ///
    /// # Errors
    ///
    /// - `BallotNotFound` if the ballot doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, ballot: &Ballot) -> Result<(), DomainError>;

    /// Find a ballot by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &BallotId) -> Result<Option<Ballot>, DomainError>;

    /// Find the PENDING or ENDED ballot for an agenda item, if any.
    async fn find_open_by_agenda_item(
        &self,
        agenda_item_id: &AgendaItemId,
    ) -> Result<Option<Ballot>, DomainError>;

    /// Insert or replace the voter's cast for the ballot.
    async fn upsert_cast(&self, cast: &CastVote) -> Result<(), DomainError>;

    /// All effective casts for a ballot.
    async fn casts_for(&self, ballot_id: &BallotId) -> Result<Vec<CastVote>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballot_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn BallotRepository) {}
    }
}

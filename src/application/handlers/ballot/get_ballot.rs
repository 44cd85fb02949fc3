//! Ballot queries.

use std::sync::Arc;

use crate::domain::ballot::{Ballot, BallotError};
use crate::domain::foundation::{AgendaItemId, BallotId};
use crate::ports::BallotRepository;

/// Query for a single ballot.
#[derive(Debug, Clone)]
pub struct GetBallotQuery {
    pub ballot_id: BallotId,
}

pub struct GetBallotHandler {
    ballots: Arc<dyn BallotRepository>,
}

impl GetBallotHandler {
    pub fn new(ballots: Arc<dyn BallotRepository>) -> Self {
        Self { ballots }
    }

    pub async fn handle(&self, query: GetBallotQuery) -> Result<Ballot, BallotError> {
        self.ballots
            .find_by_id(&query.ballot_id)
            .await?
            .ok_or(BallotError::BallotNotFound(query.ballot_id))
    }
}

/// Query for the PENDING or ENDED ballot on an agenda item, if any.
#[derive(Debug, Clone)]
pub struct ActiveBallotQuery {
    pub agenda_item_id: AgendaItemId,
}

pub struct ActiveBallotHandler {
    ballots: Arc<dyn BallotRepository>,
}

impl ActiveBallotHandler {
    pub fn new(ballots: Arc<dyn BallotRepository>) -> Self {
        Self { ballots }
    }

    pub async fn handle(&self, query: ActiveBallotQuery) -> Result<Option<Ballot>, BallotError> {
        Ok(self
            .ballots
            .find_open_by_agenda_item(&query.agenda_item_id)
            .await?)
    }
}

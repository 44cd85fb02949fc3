//! EvaluateDecisionHandler - Recomputes a ballot's decision on demand.
//!
//! Read-only: evaluates the ballot's own procedure copy against its stored
//! counts. Used to preview the outcome while voting is open and to resolve
//! a ballot that ended without a decision.

use std::sync::Arc;

use crate::domain::ballot::BallotError;
use crate::domain::foundation::BallotId;
use crate::domain::procedure::{Decision, EvaluationError, ExpressionEvaluator};
use crate::ports::BallotRepository;

/// Query for a ballot's decision.
#[derive(Debug, Clone)]
pub struct EvaluateDecisionQuery {
    pub ballot_id: BallotId,
}

pub struct EvaluateDecisionHandler {
    ballots: Arc<dyn BallotRepository>,
}

impl EvaluateDecisionHandler {
    pub fn new(ballots: Arc<dyn BallotRepository>) -> Self {
        Self { ballots }
    }

    pub async fn handle(&self, query: EvaluateDecisionQuery) -> Result<Decision, BallotError> {
        let ballot = self
            .ballots
            .find_by_id(&query.ballot_id)
            .await?
            .ok_or(BallotError::BallotNotFound(query.ballot_id))?;

        let procedure = ballot.procedure().ok_or_else(|| {
            BallotError::Decision(EvaluationError::invalid_procedure(
                "ballot has no decision procedure",
            ))
        })?;

        Ok(ExpressionEvaluator::evaluate_procedure(
            procedure,
            &ballot.snapshot(),
        )?)
    }
}

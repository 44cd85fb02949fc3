//! EndVoteHandler - Closes a ballot, freezes its counts and computes the decision.
//!
//! Two callers race for the same transition: the chair ending the vote
//! early and the close timer firing. Both go through `handle` under the
//! ballot lock, and the status check inside the lock lets exactly one of
//! them produce ENDED.

use std::sync::Arc;
use std::time::Duration;

use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, BallotError, BallotStatus, VoteEnded};
use crate::domain::foundation::{BallotId, CommandMetadata, TIMER_SOURCE};
use crate::domain::procedure::{EvaluationError, ExpressionEvaluator};
use crate::domain::tally::TallyAggregator;
use crate::ports::{
    BallotRepository, CloseTimer, EventPublisher, MeetingRepository, ParticipantDirectory,
};

use super::super::publish::publish_event;

/// Delay before a timer close that failed on infrastructure is tried again.
pub const CLOSE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Command to end voting on a ballot.
#[derive(Debug, Clone)]
pub struct EndVoteCommand {
    pub ballot_id: BallotId,
}

/// Result of closing a ballot.
#[derive(Debug, Clone)]
pub struct EndVoteResult {
    pub ballot: Ballot,
    /// Why the decision is absent despite a procedure being attached.
    pub decision_error: Option<EvaluationError>,
}

/// Handler for ending votes.
pub struct EndVoteHandler {
    ballots: Arc<dyn BallotRepository>,
    meetings: Arc<dyn MeetingRepository>,
    directory: Arc<dyn ParticipantDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
    timer: Arc<dyn CloseTimer>,
    locks: Arc<VoteLocks>,
}

impl EndVoteHandler {
    pub fn new(
        ballots: Arc<dyn BallotRepository>,
        meetings: Arc<dyn MeetingRepository>,
        directory: Arc<dyn ParticipantDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
        timer: Arc<dyn CloseTimer>,
        locks: Arc<VoteLocks>,
    ) -> Self {
        Self {
            ballots,
            meetings,
            directory,
            event_publisher,
            timer,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: EndVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<EndVoteResult, BallotError> {
        // 1. Serialize with casts and the other closer
        let _guard = self.locks.ballots.lock(&cmd.ballot_id).await;

        // 2. Load; only a PENDING ballot can end
        let mut ballot = self
            .ballots
            .find_by_id(&cmd.ballot_id)
            .await?
            .ok_or(BallotError::BallotNotFound(cmd.ballot_id))?;
        if ballot.status() != BallotStatus::Pending {
            return Err(BallotError::invalid_state(format!(
                "ballot {} is already {}",
                ballot.id(),
                ballot.status()
            )));
        }

        // 3. Final recount against the cohort as of now
        let meeting = self
            .meetings
            .find_meeting(&ballot.meeting_id())
            .await?
            .ok_or(BallotError::MeetingNotFound(ballot.meeting_id()))?;
        let cohort = self.directory.cohort(meeting.division_ids()).await?;
        let casts = self.ballots.casts_for(&ballot.id()).await?;
        let snapshot = TallyAggregator::snapshot(&casts, &cohort);

        // 4. Decision; failure leaves the ballot closable with no decision
        let (decision, decision_error) = match ballot.procedure() {
            None => (None, None),
            Some(procedure) => match ExpressionEvaluator::evaluate_procedure(procedure, &snapshot)
            {
                Ok(decision) => (Some(decision.label), None),
                Err(e) => {
                    tracing::warn!(
                        ballot_id = %ballot.id(),
                        procedure = %procedure.name,
                        error = %e,
                        "decision could not be evaluated"
                    );
                    (None, Some(e))
                }
            },
        };

        // 5. Commit, then stop the timer
        ballot.close(snapshot, decision)?;
        self.ballots.update(&ballot).await?;
        self.timer.disarm(&ballot.id());

        tracing::info!(
            ballot_id = %ballot.id(),
            decision = ?ballot.decision(),
            votes_cast = ballot.tally().votes_cast(),
            absent = ballot.tally().absent,
            source = metadata.source().unwrap_or("command"),
            "ballot ended"
        );

        // 6. Publish
        publish_event(
            self.event_publisher.as_ref(),
            &VoteEnded::new(&ballot),
            &metadata,
        )
        .await;

        Ok(EndVoteResult {
            ballot,
            decision_error,
        })
    }

    /// Timer path: ends the ballot if it is still open.
    ///
    /// Losing the race to a manual end (or a cancel) is normal and returns
    /// `None`. Returns the closed ballot when this call produced ENDED.
    /// An infrastructure failure leaves the ballot PENDING, so the timer is
    /// armed again with [`CLOSE_RETRY_DELAY`].
    pub async fn close_expired(&self, ballot_id: BallotId) -> Option<Ballot> {
        let result = self
            .handle(
                EndVoteCommand { ballot_id },
                CommandMetadata::system(TIMER_SOURCE),
            )
            .await;
        self.locks.ballots.release(&ballot_id);

        match result {
            Ok(result) => Some(result.ballot),
            Err(e @ BallotError::InvalidState(_)) | Err(e @ BallotError::BallotNotFound(_)) => {
                tracing::debug!(ballot_id = %ballot_id, reason = %e, "timer fired for closed ballot");
                None
            }
            Err(e @ BallotError::Infrastructure(_)) => {
                tracing::error!(
                    ballot_id = %ballot_id,
                    error = %e,
                    retry_in_secs = CLOSE_RETRY_DELAY.as_secs(),
                    "timer close failed"
                );
                self.timer.arm(ballot_id, CLOSE_RETRY_DELAY);
                None
            }
            Err(e) => {
                tracing::error!(ballot_id = %ballot_id, error = %e, "timer close failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::ballot::test_support::{voter, Fixture};
    use crate::domain::ballot::VoteType;
    use crate::domain::procedure::{
        BinaryOp, ConditionBlock, Counter, DecisionLabel, Element, VoteProcedure,
    };
    use crate::domain::tally::{Choice, TallySnapshot};

    #[tokio::test]
    async fn end_freezes_counts_and_decides() {
        let fx = Fixture::with_cohort(10).await;
        let ballot = fx.open_ballot().await;
        for n in 0..6 {
            fx.cast(ballot.id(), n, Choice::For).await;
        }
        for n in 6..8 {
            fx.cast(ballot.id(), n, Choice::Against).await;
        }

        let result = fx
            .end_handler()
            .handle(
                EndVoteCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        let ended = result.ballot;
        assert_eq!(ended.status(), BallotStatus::Ended);
        assert_eq!(ended.tally().for_count, 6);
        assert_eq!(ended.tally().against, 2);
        assert_eq!(ended.tally().absent, 2);
        assert_eq!(ended.decision(), Some(DecisionLabel::Accepted));
        assert!(ended.ended_at().is_some());
        assert!(result.decision_error.is_none());
        assert_eq!(fx.stored_ballot(ballot.id()).await.status(), BallotStatus::Ended);
        assert_eq!(fx.timer.disarmed.lock().unwrap().clone(), vec![ballot.id()]);
    }

    #[tokio::test]
    async fn publishes_single_ended_event() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;

        fx.end(ballot.id()).await;

        let ended = fx.bus.events_of_type("vote.ended");
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].payload["decision"], "Не принято");
        assert_eq!(ended[0].payload["ballot"]["status"], "ENDED");
    }

    #[tokio::test]
    async fn second_end_is_invalid_state() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;

        let result = fx
            .end_handler()
            .handle(
                EndVoteCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await;

        assert!(matches!(result, Err(BallotError::InvalidState(_))));
        assert_eq!(fx.bus.events_of_type("vote.ended").len(), 1);
    }

    #[tokio::test]
    async fn timer_after_manual_end_is_a_no_op() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;

        let closed = fx.end_handler().close_expired(ballot.id()).await;

        assert!(closed.is_none());
        assert_eq!(fx.bus.events_of_type("vote.ended").len(), 1);
    }

    #[tokio::test]
    async fn timer_close_is_stamped_with_timer_source() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;

        let closed = fx.end_handler().close_expired(ballot.id()).await;

        assert_eq!(closed.unwrap().status(), BallotStatus::Ended);
        let ended = fx.bus.events_of_type("vote.ended");
        assert_eq!(ended[0].metadata.source.as_deref(), Some(TIMER_SOURCE));
    }

    #[tokio::test]
    async fn cohort_changes_before_close_are_counted() {
        let fx = Fixture::with_cohort(4).await;
        let ballot = fx.open_ballot().await;
        fx.cast(ballot.id(), 0, Choice::For).await;
        fx.cast(ballot.id(), 1, Choice::For).await;
        fx.directory.remove(&voter(1)).await;
        fx.directory.add_participant(voter(4), fx.division).await;
        fx.directory.add_participant(voter(5), fx.division).await;

        let ended = fx.end(ballot.id()).await;

        assert_eq!(ended.snapshot().total_participants, 5);
        assert_eq!(ended.tally().for_count, 1);
        assert_eq!(ended.tally().absent, 4);
    }

    #[tokio::test]
    async fn failing_procedure_still_ends_without_decision() {
        let fx = Fixture::with_cohort(2).await;
        let dangling = VoteProcedure::new(
            "Оборванная",
            vec![ConditionBlock::single(vec![
                Element::counter(Counter::For),
                Element::op(BinaryOp::Gt),
            ])],
            DecisionLabel::Accepted,
        );
        let ballot = Ballot::start(
            fx.agenda_item.id(),
            fx.meeting.id(),
            "Вопрос",
            5,
            VoteType::Open,
            Some(dangling),
            TallySnapshot::default(),
        )
        .unwrap();
        fx.ballots.save(&ballot).await.unwrap();

        let result = fx
            .end_handler()
            .handle(
                EndVoteCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(result.ballot.status(), BallotStatus::Ended);
        assert_eq!(result.ballot.decision(), None);
        assert!(matches!(
            result.decision_error,
            Some(EvaluationError::MalformedExpression(_))
        ));
        assert_eq!(fx.bus.events_of_type("vote.ended").len(), 1);
    }

    #[tokio::test]
    async fn ballot_without_procedure_has_no_decision() {
        let fx = Fixture::with_cohort(2).await;
        let mut cmd = fx.start_command();
        cmd.procedure_id = None;
        let ballot = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await
            .unwrap()
            .ballot;
        fx.cast(ballot.id(), 0, Choice::For).await;

        let ended = fx.end(ballot.id()).await;

        assert_eq!(ended.decision(), None);
    }

    #[tokio::test]
    async fn manual_end_racing_timer_ends_once() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;
        let handler = Arc::new(fx.end_handler());

        let manual = {
            let handler = Arc::clone(&handler);
            let id = ballot.id();
            tokio::spawn(async move {
                handler
                    .handle(EndVoteCommand { ballot_id: id }, CommandMetadata::test_fixture())
                    .await
            })
        };
        let timer = {
            let handler = Arc::clone(&handler);
            let id = ballot.id();
            tokio::spawn(async move { handler.close_expired(id).await })
        };

        let manual_won = manual.await.unwrap().is_ok();
        let timer_won = timer.await.unwrap().is_some();

        assert!(manual_won ^ timer_won);
        assert_eq!(fx.bus.events_of_type("vote.ended").len(), 1);
    }

    #[tokio::test]
    async fn accepted_decision_is_published_with_its_label() {
        let fx = Fixture::with_cohort(1).await;
        let ballot = fx.open_ballot().await;
        fx.cast(ballot.id(), 0, Choice::For).await;

        fx.end(ballot.id()).await;

        let ended = fx.bus.events_of_type("vote.ended");
        assert_eq!(ended[0].payload["decision"], "Принято");
    }

    #[tokio::test]
    async fn failed_timer_close_rearms_and_later_succeeds() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;
        let handler = fx.end_handler();
        fx.ballot_writes.fail_writes(true);

        assert!(handler.close_expired(ballot.id()).await.is_none());

        assert_eq!(fx.stored_ballot(ballot.id()).await.status(), BallotStatus::Pending);
        assert_eq!(
            fx.timer.armed.lock().unwrap().last().copied(),
            Some((ballot.id(), CLOSE_RETRY_DELAY))
        );
        assert!(!fx.bus.has_event("vote.ended"));

        fx.ballot_writes.fail_writes(false);
        let closed = handler.close_expired(ballot.id()).await.unwrap();

        assert_eq!(closed.status(), BallotStatus::Ended);
        assert_eq!(fx.bus.events_of_type("vote.ended").len(), 1);
    }

    #[tokio::test]
    async fn lost_timer_race_does_not_rearm() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;
        let armed_before = fx.timer.armed.lock().unwrap().len();

        assert!(fx.end_handler().close_expired(ballot.id()).await.is_none());

        assert_eq!(fx.timer.armed.lock().unwrap().len(), armed_before);
    }
}

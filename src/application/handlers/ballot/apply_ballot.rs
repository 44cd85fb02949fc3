//! ApplyBallotHandler - Makes an ended ballot's decision permanent.

use std::sync::Arc;

use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, BallotError, VoteApplied};
use crate::domain::foundation::{BallotId, CommandMetadata};
use crate::ports::{BallotRepository, EventPublisher, MeetingRepository};

use super::super::publish::publish_event;
use super::restore_agenda_item;

/// Command to apply an ended ballot.
#[derive(Debug, Clone)]
pub struct ApplyBallotCommand {
    pub ballot_id: BallotId,
}

/// Handler for applying ballots.
///
/// Records the decision on the agenda item and frees the item for a new
/// ballot. The ballot becomes terminal.
pub struct ApplyBallotHandler {
    ballots: Arc<dyn BallotRepository>,
    meetings: Arc<dyn MeetingRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<VoteLocks>,
}

impl ApplyBallotHandler {
    pub fn new(
        ballots: Arc<dyn BallotRepository>,
        meetings: Arc<dyn MeetingRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<VoteLocks>,
    ) -> Self {
        Self {
            ballots,
            meetings,
            event_publisher,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: ApplyBallotCommand,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        let result = self.apply_locked(&cmd.ballot_id, &metadata).await;
        // Terminal: nothing will lock this ballot for writing again.
        self.locks.ballots.release(&cmd.ballot_id);
        result
    }

    async fn apply_locked(
        &self,
        ballot_id: &BallotId,
        metadata: &CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        // 1. Ballot lock, then transition
        let _ballot_guard = self.locks.ballots.lock(ballot_id).await;
        let mut ballot = self
            .ballots
            .find_by_id(ballot_id)
            .await?
            .ok_or(BallotError::BallotNotFound(*ballot_id))?;
        ballot.apply()?;

        // 2. Agenda item lock, record the decision
        let agenda_item_id = ballot.agenda_item_id();
        let result = self.record_decision(&ballot).await;
        self.locks.agenda_items.release(&agenda_item_id);
        result?;

        tracing::info!(
            ballot_id = %ballot.id(),
            agenda_item_id = %agenda_item_id,
            decision = ?ballot.decision(),
            "ballot applied"
        );

        // 3. Publish
        publish_event(
            self.event_publisher.as_ref(),
            &VoteApplied::new(&ballot),
            metadata,
        )
        .await;

        Ok(ballot)
    }

    /// Writes the decision onto the agenda item, then the APPLIED ballot.
    async fn record_decision(&self, ballot: &Ballot) -> Result<(), BallotError> {
        let _item_guard = self.locks.agenda_items.lock(&ballot.agenda_item_id()).await;
        let mut agenda_item = self
            .meetings
            .find_agenda_item(&ballot.agenda_item_id())
            .await?
            .ok_or(BallotError::AgendaItemNotFound(ballot.agenda_item_id()))?;
        let previous_item = agenda_item.clone();
        agenda_item.record_decision(ballot.id(), ballot.decision());

        self.meetings.update_agenda_item(&agenda_item).await?;
        if let Err(e) = self.ballots.update(ballot).await {
            restore_agenda_item(self.meetings.as_ref(), &previous_item).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::ballot::test_support::Fixture;
    use crate::domain::ballot::BallotStatus;
    use crate::domain::procedure::DecisionLabel;
    use crate::domain::tally::Choice;

    #[tokio::test]
    async fn apply_records_decision_on_agenda_item() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;
        fx.cast(ballot.id(), 0, Choice::For).await;
        fx.end(ballot.id()).await;

        let applied = fx
            .apply_handler()
            .handle(
                ApplyBallotCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(applied.status(), BallotStatus::Applied);
        let item = fx.stored_agenda_item(fx.agenda_item.id()).await;
        assert!(!item.is_voting());
        assert_eq!(item.decisions().len(), 1);
        assert_eq!(item.decisions()[0].ballot_id, ballot.id());
        assert_eq!(item.decisions()[0].decision, Some(DecisionLabel::Accepted));
        assert!(fx.bus.has_event("vote.applied"));
        assert!(fx.locks.ballots.is_empty());
    }

    #[tokio::test]
    async fn pending_ballot_cannot_be_applied() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;

        let result = fx
            .apply_handler()
            .handle(
                ApplyBallotCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await;

        assert!(matches!(result, Err(BallotError::InvalidState(_))));
        assert_eq!(fx.stored_ballot(ballot.id()).await.status(), BallotStatus::Pending);
        assert!(!fx.bus.has_event("vote.applied"));
    }

    #[tokio::test]
    async fn apply_is_not_repeatable() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;
        let handler = fx.apply_handler();
        let cmd = ApplyBallotCommand {
            ballot_id: ballot.id(),
        };
        handler
            .handle(cmd.clone(), CommandMetadata::test_fixture())
            .await
            .unwrap();

        let again = handler.handle(cmd, CommandMetadata::test_fixture()).await;

        assert!(matches!(again, Err(BallotError::InvalidState(_))));
        assert_eq!(fx.bus.events_of_type("vote.applied").len(), 1);
    }

    #[tokio::test]
    async fn applied_item_accepts_a_new_ballot() {
        let fx = Fixture::with_cohort(3).await;
        let first = fx.open_ballot().await;
        fx.end(first.id()).await;
        fx.apply_handler()
            .handle(
                ApplyBallotCommand {
                    ballot_id: first.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        let second = fx.open_ballot().await;

        assert_ne!(second.id(), first.id());
        assert_eq!(second.status(), BallotStatus::Pending);
    }

    #[tokio::test]
    async fn failed_item_write_keeps_ballot_ended() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;
        fx.meeting_writes.fail_item_writes(true);
        let cmd = ApplyBallotCommand {
            ballot_id: ballot.id(),
        };

        let result = fx
            .apply_handler()
            .handle(cmd.clone(), CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::Infrastructure(_))));
        assert_eq!(fx.stored_ballot(ballot.id()).await.status(), BallotStatus::Ended);
        assert!(fx.stored_agenda_item(fx.agenda_item.id()).await.decisions().is_empty());
        assert!(!fx.bus.has_event("vote.applied"));
        assert!(fx.locks.agenda_items.is_empty());

        fx.meeting_writes.fail_item_writes(false);
        let applied = fx
            .apply_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await
            .unwrap();
        assert_eq!(applied.status(), BallotStatus::Applied);
    }

    #[tokio::test]
    async fn failed_ballot_write_rolls_back_recorded_decision() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;
        fx.end(ballot.id()).await;
        fx.ballot_writes.fail_writes(true);

        let result = fx
            .apply_handler()
            .handle(
                ApplyBallotCommand {
                    ballot_id: ballot.id(),
                },
                CommandMetadata::test_fixture(),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(fx.stored_ballot(ballot.id()).await.status(), BallotStatus::Ended);
        let item = fx.stored_agenda_item(fx.agenda_item.id()).await;
        assert!(item.decisions().is_empty());
        assert!(item.is_voting());
    }
}

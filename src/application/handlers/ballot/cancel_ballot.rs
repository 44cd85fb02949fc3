//! CancelBallotHandler - Discards a pending or ended ballot.

use std::sync::Arc;

use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, BallotError, VoteCancelled};
use crate::domain::foundation::{BallotId, CommandMetadata};
use crate::ports::{BallotRepository, CloseTimer, EventPublisher, MeetingRepository};

use super::super::publish::publish_event;
use super::restore_agenda_item;

/// Command to cancel a ballot.
#[derive(Debug, Clone)]
pub struct CancelBallotCommand {
    pub ballot_id: BallotId,
}

/// Handler for cancelling ballots. Casts are kept but no longer count.
pub struct CancelBallotHandler {
    ballots: Arc<dyn BallotRepository>,
    meetings: Arc<dyn MeetingRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    timer: Arc<dyn CloseTimer>,
    locks: Arc<VoteLocks>,
}

impl CancelBallotHandler {
    pub fn new(
        ballots: Arc<dyn BallotRepository>,
        meetings: Arc<dyn MeetingRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        timer: Arc<dyn CloseTimer>,
        locks: Arc<VoteLocks>,
    ) -> Self {
        Self {
            ballots,
            meetings,
            event_publisher,
            timer,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelBallotCommand,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        let result = self.cancel_locked(&cmd.ballot_id, &metadata).await;
        self.locks.ballots.release(&cmd.ballot_id);
        result
    }

    async fn cancel_locked(
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
        ballot.cancel()?;

        // 2. Free the agenda item, then stop the timer
        let agenda_item_id = ballot.agenda_item_id();
        let result = self.free_agenda_item(&ballot).await;
        self.locks.agenda_items.release(&agenda_item_id);
        result?;
        self.timer.disarm(&ballot.id());

        tracing::info!(ballot_id = %ballot.id(), "ballot cancelled");

        // 3. Publish
        publish_event(
            self.event_publisher.as_ref(),
            &VoteCancelled::new(&ballot),
            metadata,
        )
        .await;

        Ok(ballot)
    }

    async fn free_agenda_item(&self, ballot: &Ballot) -> Result<(), BallotError> {
        let _item_guard = self.locks.agenda_items.lock(&ballot.agenda_item_id()).await;
        let mut agenda_item = self
            .meetings
            .find_agenda_item(&ballot.agenda_item_id())
            .await?
            .ok_or(BallotError::AgendaItemNotFound(ballot.agenda_item_id()))?;
        let previous_item = agenda_item.clone();
        agenda_item.mark_not_voting();

        self.meetings.update_agenda_item(&agenda_item).await?;
        if let Err(e) = self.ballots.update(ballot).await {
            restore_agenda_item(self.meetings.as_ref(), &previous_item).await;
            return Err(e.into());
        }
        Ok(())
    }
}

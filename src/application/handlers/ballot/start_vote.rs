//! StartVoteHandler - Command handler for opening a ballot on an agenda item.

use std::sync::Arc;
use std::time::Duration;

use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, BallotError, VotePending, VoteType};
use crate::domain::foundation::{AgendaItemId, CommandMetadata, ProcedureId};
use crate::domain::tally::TallyAggregator;
use crate::ports::{
    BallotRepository, CloseTimer, EventPublisher, MeetingRepository, ParticipantDirectory,
    ProcedureRepository,
};

use super::super::publish::publish_event;
use super::{restore_agenda_item, VotingPolicy};

/// Command to open a ballot.
#[derive(Debug, Clone)]
pub struct StartVoteCommand {
    pub agenda_item_id: AgendaItemId,
    /// Blank or missing falls back to the policy's default question.
    pub question: Option<String>,
    pub duration_secs: u64,
    pub procedure_id: Option<ProcedureId>,
    pub vote_type: Option<VoteType>,
}

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartVoteResult {
    pub ballot: Ballot,
}

/// Handler for opening ballots.
pub struct StartVoteHandler {
    ballots: Arc<dyn BallotRepository>,
    meetings: Arc<dyn MeetingRepository>,
    procedures: Arc<dyn ProcedureRepository>,
    directory: Arc<dyn ParticipantDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
    timer: Arc<dyn CloseTimer>,
    locks: Arc<VoteLocks>,
    policy: VotingPolicy,
}

impl StartVoteHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ballots: Arc<dyn BallotRepository>,
        meetings: Arc<dyn MeetingRepository>,
        procedures: Arc<dyn ProcedureRepository>,
        directory: Arc<dyn ParticipantDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
        timer: Arc<dyn CloseTimer>,
        locks: Arc<VoteLocks>,
        policy: VotingPolicy,
    ) -> Self {
        Self {
            ballots,
            meetings,
            procedures,
            directory,
            event_publisher,
            timer,
            locks,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<StartVoteResult, BallotError> {
        // 1. Validate request shape before touching anything
        if !self.policy.allows_duration(cmd.duration_secs) {
            return Err(BallotError::invalid_input(format!(
                "duration must be between {} and {} seconds, got {}",
                self.policy.min_duration_secs.max(1),
                self.policy.max_duration_secs,
                cmd.duration_secs
            )));
        }
        let question = cmd
            .question
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.policy.default_question.clone());

        let agenda_item_id = cmd.agenda_item_id;
        let result = self.start_locked(cmd, question, &metadata).await;
        self.locks.agenda_items.release(&agenda_item_id);
        result
    }

    async fn start_locked(
        &self,
        cmd: StartVoteCommand,
        question: String,
        metadata: &CommandMetadata,
    ) -> Result<StartVoteResult, BallotError> {
        // 2. Serialize starts on this agenda item
        let _item_guard = self.locks.agenda_items.lock(&cmd.agenda_item_id).await;

        // 3. Load agenda item and its meeting
        let mut agenda_item = self
            .meetings
            .find_agenda_item(&cmd.agenda_item_id)
            .await?
            .ok_or(BallotError::AgendaItemNotFound(cmd.agenda_item_id))?;
        let meeting = self
            .meetings
            .find_meeting(&agenda_item.meeting_id())
            .await?
            .ok_or(BallotError::MeetingNotFound(agenda_item.meeting_id()))?;
        if !meeting.has_divisions() {
            return Err(BallotError::invalid_input(format!(
                "meeting {} has no divisions to vote",
                meeting.id()
            )));
        }

        // 4. At most one open ballot per agenda item
        if let Some(open) = self
            .ballots
            .find_open_by_agenda_item(&cmd.agenda_item_id)
            .await?
        {
            return Err(BallotError::VoteAlreadyActive {
                agenda_item_id: cmd.agenda_item_id,
                ballot_id: open.id(),
            });
        }

        // 5. Snapshot the procedure
        let procedure = match cmd.procedure_id {
            Some(id) => {
                let procedure = self
                    .procedures
                    .find_by_id(&id)
                    .await?
                    .ok_or(BallotError::ProcedureNotFound(id))?;
                procedure.validate()?;
                Some(procedure)
            }
            None => None,
        };

        // 6. Fresh cohort: everyone starts absent
        let cohort = self.directory.cohort(meeting.division_ids()).await?;
        let snapshot = TallyAggregator::snapshot(&[], &cohort);

        // 7. Create, then persist the agenda item before the ballot.
        // A stored PENDING ballot blocks the item, so it is written last.
        let ballot = Ballot::start(
            agenda_item.id(),
            meeting.id(),
            question,
            cmd.duration_secs,
            cmd.vote_type.unwrap_or_default(),
            procedure,
            snapshot,
        )?;
        let previous_item = agenda_item.clone();
        agenda_item.mark_voting();
        self.meetings.update_agenda_item(&agenda_item).await?;
        if let Err(e) = self.ballots.save(&ballot).await {
            restore_agenda_item(self.meetings.as_ref(), &previous_item).await;
            return Err(e.into());
        }

        // 8. Arm the close timer
        self.timer.arm(ballot.id(), Duration::from_secs(cmd.duration_secs));

        tracing::info!(
            ballot_id = %ballot.id(),
            agenda_item_id = %ballot.agenda_item_id(),
            cohort_size = cohort.size(),
            duration_secs = cmd.duration_secs,
            "ballot opened"
        );

        // 9. Publish
        publish_event(
            self.event_publisher.as_ref(),
            &VotePending::new(&ballot),
            metadata,
        )
        .await;

        Ok(StartVoteResult { ballot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::ballot::test_support::Fixture;
    use crate::domain::ballot::BallotStatus;
    use crate::domain::foundation::{DivisionId, UserId};
    use crate::domain::meeting::{AgendaItem, Meeting};
    use crate::domain::procedure::{ConditionBlock, DecisionLabel, Element, VoteProcedure};

    #[tokio::test]
    async fn opens_pending_ballot_with_everyone_absent() {
        let fx = Fixture::with_cohort(10).await;

        let ballot = fx.open_ballot().await;

        assert_eq!(ballot.status(), BallotStatus::Pending);
        assert_eq!(ballot.tally().absent, 10);
        assert_eq!(ballot.snapshot().total_participants, 10);
        assert_eq!(ballot.question(), "Утвердить бюджет");
        assert_eq!(ballot.procedure(), Some(&fx.procedure));
    }

    #[tokio::test]
    async fn marks_agenda_item_voting_arms_timer_and_publishes() {
        let fx = Fixture::with_cohort(3).await;

        let ballot = fx.open_ballot().await;

        assert!(fx.stored_agenda_item(fx.agenda_item.id()).await.is_voting());
        assert_eq!(
            fx.timer.armed.lock().unwrap().clone(),
            vec![(ballot.id(), Duration::from_secs(5))]
        );
        assert_eq!(fx.bus.event_types(), vec!["vote.pending"]);
    }

    #[tokio::test]
    async fn second_start_on_same_item_is_rejected() {
        let fx = Fixture::with_cohort(3).await;
        let first = fx.open_ballot().await;

        let result = fx
            .start_handler()
            .handle(fx.start_command(), CommandMetadata::test_fixture())
            .await;

        match result {
            Err(BallotError::VoteAlreadyActive { ballot_id, .. }) => {
                assert_eq!(ballot_id, first.id())
            }
            other => panic!("expected VoteAlreadyActive, got {:?}", other),
        }
        assert_eq!(fx.bus.event_count(), 1);
    }

    #[tokio::test]
    async fn rejects_zero_duration_without_side_effects() {
        let fx = Fixture::with_cohort(3).await;
        let mut cmd = fx.start_command();
        cmd.duration_secs = 0;

        let result = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::InvalidInput(_))));
        assert_eq!(fx.ballots.ballot_count().await, 0);
        assert_eq!(fx.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn unknown_agenda_item_is_not_found() {
        let fx = Fixture::with_cohort(3).await;
        let mut cmd = fx.start_command();
        cmd.agenda_item_id = AgendaItemId::new();

        let result = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::AgendaItemNotFound(_))));
    }

    #[tokio::test]
    async fn meeting_without_divisions_is_invalid_input() {
        let fx = Fixture::with_cohort(3).await;
        let bare = Meeting::new("Пусто", vec![]);
        let item = AgendaItem::new(bare.id(), "Вопрос");
        fx.meetings.insert_meeting(bare).await;
        fx.meetings.insert_agenda_item(item.clone()).await;
        let mut cmd = fx.start_command();
        cmd.agenda_item_id = item.id();

        let result = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn malformed_procedure_is_invalid_input() {
        let fx = Fixture::with_cohort(3).await;
        let broken = VoteProcedure::new(
            "Сломанная",
            vec![ConditionBlock::single(vec!["За".parse::<Element>().unwrap()])],
            DecisionLabel::Accepted,
        );
        fx.procedures.insert(broken.clone()).await;
        let mut cmd = fx.start_command();
        cmd.procedure_id = Some(broken.id);

        let result = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::InvalidInput(_))));
        assert!(!fx.stored_agenda_item(fx.agenda_item.id()).await.is_voting());
    }

    #[tokio::test]
    async fn unknown_procedure_is_not_found() {
        let fx = Fixture::with_cohort(3).await;
        let mut cmd = fx.start_command();
        cmd.procedure_id = Some(ProcedureId::new());

        let result = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::ProcedureNotFound(_))));
    }

    #[tokio::test]
    async fn blank_question_uses_policy_default() {
        let fx = Fixture::with_cohort(3).await;
        let mut cmd = fx.start_command();
        cmd.question = Some("   ".to_string());
        cmd.procedure_id = None;

        let ballot = fx
            .start_handler()
            .handle(cmd, CommandMetadata::test_fixture())
            .await
            .unwrap()
            .ballot;

        assert_eq!(ballot.question(), VotingPolicy::default().default_question);
        assert!(ballot.procedure().is_none());
    }

    #[tokio::test]
    async fn cohort_only_counts_meeting_divisions() {
        let fx = Fixture::with_cohort(4).await;
        fx.directory
            .add_participant(UserId::new("outsider").unwrap(), DivisionId::new())
            .await;

        let ballot = fx.open_ballot().await;

        assert_eq!(ballot.snapshot().total_participants, 4);
    }

    #[tokio::test]
    async fn failed_item_write_leaves_nothing_behind() {
        let fx = Fixture::with_cohort(3).await;
        fx.meeting_writes.fail_item_writes(true);

        let result = fx
            .start_handler()
            .handle(fx.start_command(), CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::Infrastructure(_))));
        assert_eq!(fx.ballots.ballot_count().await, 0);
        assert!(fx.timer.armed.lock().unwrap().is_empty());
        assert_eq!(fx.bus.event_count(), 0);

        fx.meeting_writes.fail_item_writes(false);
        let retried = fx
            .start_handler()
            .handle(fx.start_command(), CommandMetadata::test_fixture())
            .await
            .unwrap();
        assert_eq!(retried.ballot.status(), BallotStatus::Pending);
    }

    #[tokio::test]
    async fn failed_ballot_write_restores_agenda_item() {
        let fx = Fixture::with_cohort(3).await;
        fx.ballot_writes.fail_writes(true);

        let result = fx
            .start_handler()
            .handle(fx.start_command(), CommandMetadata::test_fixture())
            .await;

        assert!(matches!(result, Err(BallotError::Infrastructure(_))));
        assert!(!fx.stored_agenda_item(fx.agenda_item.id()).await.is_voting());
        assert!(fx.timer.armed.lock().unwrap().is_empty());
        assert!(!fx.bus.has_event("vote.pending"));
    }

    #[tokio::test]
    async fn agenda_item_lock_is_released() {
        let fx = Fixture::with_cohort(2).await;

        fx.open_ballot().await;
        let _ = fx
            .start_handler()
            .handle(fx.start_command(), CommandMetadata::test_fixture())
            .await;

        assert!(fx.locks.agenda_items.is_empty());
    }
}

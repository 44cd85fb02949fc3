//! CastVoteHandler - Command handler for recording a participant's vote.
//!
//! A recast overwrites the voter's previous choice. Every cast triggers a
//! full recount against the cohort as it is right now, so the tally always
//! sums to the current cohort size.

use std::sync::Arc;

use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, BallotError, VotePending};
use crate::domain::foundation::{BallotId, CommandMetadata, UserId};
use crate::domain::tally::{CastVote, Choice, TallyAggregator};
use crate::ports::{BallotRepository, EventPublisher, MeetingRepository, ParticipantDirectory};

use super::super::publish::publish_event;

/// Command to cast (or recast) a vote.
#[derive(Debug, Clone)]
pub struct CastVoteCommand {
    pub ballot_id: BallotId,
    pub voter_id: UserId,
    /// Wire name or screen label of the choice.
    pub choice: String,
}

/// Result of a successful cast.
#[derive(Debug, Clone)]
pub struct CastVoteResult {
    pub ballot: Ballot,
}

/// Handler for casting votes.
pub struct CastVoteHandler {
    ballots: Arc<dyn BallotRepository>,
    meetings: Arc<dyn MeetingRepository>,
    directory: Arc<dyn ParticipantDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
    locks: Arc<VoteLocks>,
}

impl CastVoteHandler {
    pub fn new(
        ballots: Arc<dyn BallotRepository>,
        meetings: Arc<dyn MeetingRepository>,
        directory: Arc<dyn ParticipantDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
        locks: Arc<VoteLocks>,
    ) -> Self {
        Self {
            ballots,
            meetings,
            directory,
            event_publisher,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: CastVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<CastVoteResult, BallotError> {
        // 1. Parse choice
        let choice: Choice = cmd
            .choice
            .parse()
            .map_err(|_| BallotError::InvalidChoice(cmd.choice.clone()))?;

        // 2. Serialize with other writers of this ballot
        let _guard = self.locks.ballots.lock(&cmd.ballot_id).await;

        // 3. Load and check status
        let mut ballot = self
            .ballots
            .find_by_id(&cmd.ballot_id)
            .await?
            .ok_or(BallotError::BallotNotFound(cmd.ballot_id))?;
        ballot.ensure_accepts_casts()?;

        // 4. Eligibility against the current cohort
        let meeting = self
            .meetings
            .find_meeting(&ballot.meeting_id())
            .await?
            .ok_or(BallotError::MeetingNotFound(ballot.meeting_id()))?;
        let cohort = self.directory.cohort(meeting.division_ids()).await?;
        if !cohort.contains(&cmd.voter_id) {
            return Err(BallotError::VoterNotEligible(cmd.voter_id));
        }

        // 5. Record the cast, then recount from scratch
        let cast = CastVote::new(cmd.voter_id, ballot.id(), choice);
        self.ballots.upsert_cast(&cast).await?;
        let casts = self.ballots.casts_for(&ballot.id()).await?;
        ballot.record_tally(TallyAggregator::snapshot(&casts, &cohort))?;
        self.ballots.update(&ballot).await?;

        tracing::debug!(
            ballot_id = %ballot.id(),
            voter_id = %cast.voter_id,
            choice = %choice,
            votes_cast = ballot.tally().votes_cast(),
            "vote recorded"
        );

        // 6. Publish the running tally
        publish_event(
            self.event_publisher.as_ref(),
            &VotePending::new(&ballot),
            &metadata,
        )
        .await;

        Ok(CastVoteResult { ballot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::ballot::test_support::{voter, Fixture};
    use crate::domain::ballot::BallotStatus;
    use crate::domain::foundation::DivisionId;
    use crate::domain::tally::Tally;

    fn command(ballot_id: BallotId, voter_id: UserId, choice: &str) -> CastVoteCommand {
        CastVoteCommand {
            ballot_id,
            voter_id,
            choice: choice.to_string(),
        }
    }

    #[tokio::test]
    async fn cast_updates_running_tally() {
        let fx = Fixture::with_cohort(4).await;
        let ballot = fx.open_ballot().await;

        fx.cast(ballot.id(), 0, Choice::For).await;
        let updated = fx.cast(ballot.id(), 1, Choice::Against).await;

        assert_eq!(
            *updated.tally(),
            Tally {
                for_count: 1,
                against: 1,
                abstain: 0,
                absent: 2,
            }
        );
        assert_eq!(fx.stored_ballot(ballot.id()).await.tally(), updated.tally());
    }

    #[tokio::test]
    async fn recast_overwrites_previous_choice() {
        let fx = Fixture::with_cohort(3).await;
        let ballot = fx.open_ballot().await;

        fx.cast(ballot.id(), 0, Choice::For).await;
        let updated = fx.cast(ballot.id(), 0, Choice::Abstain).await;

        assert_eq!(updated.tally().for_count, 0);
        assert_eq!(updated.tally().abstain, 1);
        assert_eq!(updated.tally().absent, 2);
        assert_eq!(fx.ballots.casts_for(&ballot.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn accepts_screen_labels() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;

        let result = fx
            .cast_handler()
            .handle(
                command(ballot.id(), voter(0), "Против"),
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(result.ballot.tally().against, 1);
    }

    #[tokio::test]
    async fn unknown_choice_is_rejected_before_loading() {
        let fx = Fixture::with_cohort(2).await;

        let result = fx
            .cast_handler()
            .handle(
                command(BallotId::new(), voter(0), "MAYBE"),
                CommandMetadata::test_fixture(),
            )
            .await;

        assert!(matches!(result, Err(BallotError::InvalidChoice(_))));
    }

    #[tokio::test]
    async fn unknown_ballot_is_not_found() {
        let fx = Fixture::with_cohort(2).await;

        let result = fx
            .cast_handler()
            .handle(
                command(BallotId::new(), voter(0), "FOR"),
                CommandMetadata::test_fixture(),
            )
            .await;

        assert!(matches!(result, Err(BallotError::BallotNotFound(_))));
    }

    #[tokio::test]
    async fn outsider_and_admin_are_not_eligible() {
        let fx = Fixture::with_cohort(2).await;
        let outsider = UserId::new("outsider").unwrap();
        fx.directory
            .add_participant(outsider.clone(), DivisionId::new())
            .await;
        let ballot = fx.open_ballot().await;

        for user in [outsider, UserId::new("chair").unwrap()] {
            let result = fx
                .cast_handler()
                .handle(
                    command(ballot.id(), user, "FOR"),
                    CommandMetadata::test_fixture(),
                )
                .await;
            assert!(matches!(result, Err(BallotError::VoterNotEligible(_))));
        }
        assert_eq!(fx.stored_ballot(ballot.id()).await.tally().votes_cast(), 0);
    }

    #[tokio::test]
    async fn cohort_growth_is_reflected_on_next_cast() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;
        fx.directory.add_participant(voter(2), fx.division).await;

        let updated = fx.cast(ballot.id(), 2, Choice::For).await;

        assert_eq!(updated.snapshot().total_participants, 3);
        assert_eq!(updated.tally().absent, 2);
        assert_eq!(updated.tally().total(), 3);
    }

    #[tokio::test]
    async fn each_cast_publishes_pending_update() {
        let fx = Fixture::with_cohort(2).await;
        let ballot = fx.open_ballot().await;

        fx.cast(ballot.id(), 0, Choice::For).await;
        fx.cast(ballot.id(), 1, Choice::For).await;

        assert_eq!(fx.bus.events_of_type("vote.pending").len(), 3);
        let last = fx.bus.published_events().pop().unwrap();
        assert_eq!(last.payload["ballot"]["for"], 2);
        assert_eq!(last.payload["ballot"]["status"], "PENDING");
    }

    #[tokio::test]
    async fn concurrent_casts_are_all_counted() {
        let fx = Fixture::with_cohort(20).await;
        let ballot = fx.open_ballot().await;
        let handler = Arc::new(fx.cast_handler());

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let handler = Arc::clone(&handler);
                let cmd = command(ballot.id(), voter(n), "FOR");
                tokio::spawn(async move {
                    handler.handle(cmd, CommandMetadata::test_fixture()).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = fx.stored_ballot(ballot.id()).await;
        assert_eq!(stored.tally().for_count, 20);
        assert_eq!(stored.tally().absent, 0);
        assert_eq!(stored.status(), BallotStatus::Pending);
    }
}

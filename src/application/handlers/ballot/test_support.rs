//! Shared fixture for ballot handler tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::{
    InMemoryBallotStore, InMemoryEventBus, InMemoryMeetingStore, InMemoryParticipantDirectory,
    InMemoryProcedureStore,
};
use crate::application::locks::VoteLocks;
use crate::domain::ballot::{Ballot, VoteType};
use crate::domain::foundation::{
    AgendaItemId, BallotId, CommandMetadata, DivisionId, DomainError, ErrorCode, MeetingId, UserId,
};
use crate::domain::meeting::{AgendaItem, Meeting};
use crate::domain::procedure::VoteProcedure;
use crate::domain::tally::{CastVote, Choice};
use crate::ports::{BallotRepository, CloseTimer, MeetingRepository};

use super::{
    ApplyBallotHandler, CancelBallotHandler, CastVoteCommand, CastVoteHandler, EndVoteCommand,
    EndVoteHandler, StartVoteCommand, StartVoteHandler, VotingPolicy,
};

/// Records arm/disarm calls instead of scheduling anything.
#[derive(Default)]
pub struct RecordingTimer {
    pub armed: Mutex<Vec<(BallotId, Duration)>>,
    pub disarmed: Mutex<Vec<BallotId>>,
}

impl CloseTimer for RecordingTimer {
    fn arm(&self, ballot_id: BallotId, after: Duration) {
        self.armed.lock().unwrap().push((ballot_id, after));
    }

    fn disarm(&self, ballot_id: &BallotId) {
        self.disarmed.lock().unwrap().push(*ballot_id);
    }

    fn armed_count(&self) -> usize {
        let armed = self.armed.lock().unwrap().len();
        let disarmed = self.disarmed.lock().unwrap().len();
        armed.saturating_sub(disarmed)
    }
}

fn write_failure() -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, "store unavailable")
}

/// Ballot store whose `save`/`update` fail while `failing` is set.
pub struct SwitchableBallotStore {
    inner: Arc<InMemoryBallotStore>,
    pub failing: AtomicBool,
}

impl SwitchableBallotStore {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl BallotRepository for SwitchableBallotStore {
    async fn save(&self, ballot: &Ballot) -> Result<(), DomainError> {
        self.check()?;
        self.inner.save(ballot).await
    }

    async fn update(&self, ballot: &Ballot) -> Result<(), DomainError> {
        self.check()?;
        self.inner.update(ballot).await
    }

    async fn find_by_id(&self, id: &BallotId) -> Result<Option<Ballot>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_open_by_agenda_item(
        &self,
        agenda_item_id: &AgendaItemId,
    ) -> Result<Option<Ballot>, DomainError> {
        self.inner.find_open_by_agenda_item(agenda_item_id).await
    }

    async fn upsert_cast(&self, cast: &CastVote) -> Result<(), DomainError> {
        self.inner.upsert_cast(cast).await
    }

    async fn casts_for(&self, ballot_id: &BallotId) -> Result<Vec<CastVote>, DomainError> {
        self.inner.casts_for(ballot_id).await
    }
}

/// Meeting store whose `update_agenda_item` fails while `failing` is set.
pub struct SwitchableMeetingStore {
    inner: Arc<InMemoryMeetingStore>,
    pub failing: AtomicBool,
}

impl SwitchableMeetingStore {
    pub fn fail_item_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MeetingRepository for SwitchableMeetingStore {
    async fn find_meeting(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError> {
        self.inner.find_meeting(id).await
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<(), DomainError> {
        self.inner.update_meeting(meeting).await
    }

    async fn find_agenda_item(&self, id: &AgendaItemId) -> Result<Option<AgendaItem>, DomainError> {
        self.inner.find_agenda_item(id).await
    }

    async fn update_agenda_item(&self, item: &AgendaItem) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        self.inner.update_agenda_item(item).await
    }
}

/// In-memory stores plus switchable views over them. Handlers see the
/// switchable views; tests read and seed through the plain stores.
pub struct Fixture {
    pub ballots: Arc<InMemoryBallotStore>,
    pub meetings: Arc<InMemoryMeetingStore>,
    pub ballot_writes: Arc<SwitchableBallotStore>,
    pub meeting_writes: Arc<SwitchableMeetingStore>,
    pub procedures: Arc<InMemoryProcedureStore>,
    pub directory: Arc<InMemoryParticipantDirectory>,
    pub bus: Arc<InMemoryEventBus>,
    pub timer: Arc<RecordingTimer>,
    pub locks: Arc<VoteLocks>,
    pub division: DivisionId,
    pub meeting: Meeting,
    pub agenda_item: AgendaItem,
    pub procedure: VoteProcedure,
}

impl Fixture {
    /// A meeting with one division of `cohort_size` voters and an admin.
    pub async fn with_cohort(cohort_size: usize) -> Self {
        let ballots = Arc::new(InMemoryBallotStore::new());
        let meetings = Arc::new(InMemoryMeetingStore::new());
        let procedures = Arc::new(InMemoryProcedureStore::new());
        let directory = Arc::new(InMemoryParticipantDirectory::new());

        let division = DivisionId::new();
        let meeting = Meeting::new("Совет", vec![division]);
        let agenda_item = AgendaItem::new(meeting.id(), "Бюджет");
        meetings.insert_meeting(meeting.clone()).await;
        meetings.insert_agenda_item(agenda_item.clone()).await;

        for n in 0..cohort_size {
            directory.add_participant(voter(n), division).await;
        }
        directory
            .add_admin(UserId::new("chair").unwrap(), division)
            .await;

        let procedure = VoteProcedure::simple_majority();
        procedures.insert(procedure.clone()).await;

        Self {
            ballot_writes: Arc::new(SwitchableBallotStore {
                inner: ballots.clone(),
                failing: AtomicBool::new(false),
            }),
            meeting_writes: Arc::new(SwitchableMeetingStore {
                inner: meetings.clone(),
                failing: AtomicBool::new(false),
            }),
            ballots,
            meetings,
            procedures,
            directory,
            bus: Arc::new(InMemoryEventBus::new()),
            timer: Arc::new(RecordingTimer::default()),
            locks: Arc::new(VoteLocks::new()),
            division,
            meeting,
            agenda_item,
            procedure,
        }
    }

    pub fn start_handler(&self) -> StartVoteHandler {
        StartVoteHandler::new(
            self.ballot_writes.clone(),
            self.meeting_writes.clone(),
            self.procedures.clone(),
            self.directory.clone(),
            self.bus.clone(),
            self.timer.clone(),
            self.locks.clone(),
            VotingPolicy::default(),
        )
    }

    pub fn cast_handler(&self) -> CastVoteHandler {
        CastVoteHandler::new(
            self.ballot_writes.clone(),
            self.meeting_writes.clone(),
            self.directory.clone(),
            self.bus.clone(),
            self.locks.clone(),
        )
    }

    pub fn end_handler(&self) -> EndVoteHandler {
        EndVoteHandler::new(
            self.ballot_writes.clone(),
            self.meeting_writes.clone(),
            self.directory.clone(),
            self.bus.clone(),
            self.timer.clone(),
            self.locks.clone(),
        )
    }

    pub fn apply_handler(&self) -> ApplyBallotHandler {
        ApplyBallotHandler::new(
            self.ballot_writes.clone(),
            self.meeting_writes.clone(),
            self.bus.clone(),
            self.locks.clone(),
        )
    }

    pub fn cancel_handler(&self) -> CancelBallotHandler {
        CancelBallotHandler::new(
            self.ballot_writes.clone(),
            self.meeting_writes.clone(),
            self.bus.clone(),
            self.timer.clone(),
            self.locks.clone(),
        )
    }

    pub fn start_command(&self) -> StartVoteCommand {
        StartVoteCommand {
            agenda_item_id: self.agenda_item.id(),
            question: Some("Утвердить бюджет".to_string()),
            duration_secs: 5,
            procedure_id: Some(self.procedure.id),
            vote_type: Some(VoteType::Open),
        }
    }

    /// Starts a ballot on the fixture's agenda item.
    pub async fn open_ballot(&self) -> Ballot {
        self.start_handler()
            .handle(self.start_command(), CommandMetadata::test_fixture())
            .await
            .unwrap()
            .ballot
    }

    pub async fn cast(&self, ballot_id: BallotId, voter_n: usize, choice: Choice) -> Ballot {
        self.cast_handler()
            .handle(
                CastVoteCommand {
                    ballot_id,
                    voter_id: voter(voter_n),
                    choice: choice.to_string(),
                },
                CommandMetadata::test_fixture(),
            )
            .await
            .unwrap()
            .ballot
    }

    /// Ends a ballot through the manual path.
    pub async fn end(&self, ballot_id: BallotId) -> Ballot {
        self.end_handler()
            .handle(EndVoteCommand { ballot_id }, CommandMetadata::test_fixture())
            .await
            .unwrap()
            .ballot
    }

    pub async fn stored_ballot(&self, ballot_id: BallotId) -> Ballot {
        self.ballots.find_by_id(&ballot_id).await.unwrap().unwrap()
    }

    pub async fn stored_agenda_item(&self, id: AgendaItemId) -> AgendaItem {
        self.meetings.find_agenda_item(&id).await.unwrap().unwrap()
    }
}

pub fn voter(n: usize) -> UserId {
    UserId::new(format!("voter-{}", n)).unwrap()
}

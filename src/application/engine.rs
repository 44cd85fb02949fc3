//! VoteEngine - Composition of the vote handlers over one set of ports.
//!
//! Owns the close timer and the worker that turns timer expiries into
//! closes. Every handler shares one `VoteLocks`, so manual commands and
//! timer closes serialize on the same per-ballot lock.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapters::TokioCloseTimer;
use crate::domain::ballot::{Ballot, BallotError};
use crate::domain::foundation::{AgendaItemId, BallotId, CommandMetadata};
use crate::domain::meeting::{Meeting, MeetingError};
use crate::domain::procedure::Decision;
use crate::ports::{
    BallotRepository, CloseTimer, EventPublisher, MeetingRepository, ParticipantDirectory,
    ProcedureRepository,
};

use super::close_worker::CloseWorker;
use super::handlers::{
    ActiveBallotHandler, ActiveBallotQuery, ApplyBallotCommand, ApplyBallotHandler,
    CancelBallotCommand, CancelBallotHandler, CastVoteCommand, CastVoteHandler,
    ChangeMeetingStatusCommand, ChangeMeetingStatusHandler, ChangeUserStatusCommand,
    ChangeUserStatusHandler, EndVoteCommand, EndVoteHandler, EndVoteResult,
    EvaluateDecisionHandler, EvaluateDecisionQuery, GetBallotHandler, GetBallotQuery,
    SetActiveAgendaItemCommand, SetActiveAgendaItemHandler, StartVoteCommand, StartVoteHandler,
    VotingPolicy,
};
use super::locks::VoteLocks;

/// The external collaborators the engine runs against.
#[derive(Clone)]
pub struct EnginePorts {
    pub ballots: Arc<dyn BallotRepository>,
    pub meetings: Arc<dyn MeetingRepository>,
    pub procedures: Arc<dyn ProcedureRepository>,
    pub directory: Arc<dyn ParticipantDirectory>,
    pub publisher: Arc<dyn EventPublisher>,
}

/// Entry point for every vote and status command.
pub struct VoteEngine {
    start_vote: StartVoteHandler,
    cast_vote: CastVoteHandler,
    end_vote: Arc<EndVoteHandler>,
    apply_ballot: ApplyBallotHandler,
    cancel_ballot: CancelBallotHandler,
    evaluate_decision: EvaluateDecisionHandler,
    get_ballot: GetBallotHandler,
    active_ballot: ActiveBallotHandler,
    change_meeting_status: ChangeMeetingStatusHandler,
    set_active_agenda_item: SetActiveAgendaItemHandler,
    change_user_status: ChangeUserStatusHandler,
    timer: Arc<TokioCloseTimer>,
    shutdown: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl VoteEngine {
    /// Wires the handlers and spawns the close worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(ports: EnginePorts, policy: VotingPolicy) -> Self {
        let (timer, expired) = TokioCloseTimer::new();
        let timer = Arc::new(timer);
        let close_timer: Arc<dyn CloseTimer> = timer.clone();
        let locks = Arc::new(VoteLocks::new());

        let end_vote = Arc::new(EndVoteHandler::new(
            ports.ballots.clone(),
            ports.meetings.clone(),
            ports.directory.clone(),
            ports.publisher.clone(),
            close_timer.clone(),
            locks.clone(),
        ));

        let (shutdown, shutdown_rx) = watch::channel(false);
        let worker = tokio::spawn(CloseWorker::new(end_vote.clone(), expired).run(shutdown_rx));

        tracing::info!(
            min_duration_secs = policy.min_duration_secs,
            max_duration_secs = policy.max_duration_secs,
            "vote engine started"
        );

        Self {
            start_vote: StartVoteHandler::new(
                ports.ballots.clone(),
                ports.meetings.clone(),
                ports.procedures.clone(),
                ports.directory.clone(),
                ports.publisher.clone(),
                close_timer.clone(),
                locks.clone(),
                policy,
            ),
            cast_vote: CastVoteHandler::new(
                ports.ballots.clone(),
                ports.meetings.clone(),
                ports.directory.clone(),
                ports.publisher.clone(),
                locks.clone(),
            ),
            end_vote,
            apply_ballot: ApplyBallotHandler::new(
                ports.ballots.clone(),
                ports.meetings.clone(),
                ports.publisher.clone(),
                locks.clone(),
            ),
            cancel_ballot: CancelBallotHandler::new(
                ports.ballots.clone(),
                ports.meetings.clone(),
                ports.publisher.clone(),
                close_timer,
                locks,
            ),
            evaluate_decision: EvaluateDecisionHandler::new(ports.ballots.clone()),
            get_ballot: GetBallotHandler::new(ports.ballots.clone()),
            active_ballot: ActiveBallotHandler::new(ports.ballots),
            change_meeting_status: ChangeMeetingStatusHandler::new(
                ports.meetings.clone(),
                ports.publisher.clone(),
            ),
            set_active_agenda_item: SetActiveAgendaItemHandler::new(
                ports.meetings,
                ports.publisher.clone(),
            ),
            change_user_status: ChangeUserStatusHandler::new(ports.directory, ports.publisher),
            timer,
            shutdown,
            worker,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ballot commands
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn start_vote(
        &self,
        cmd: StartVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        Ok(self.start_vote.handle(cmd, metadata).await?.ballot)
    }

    pub async fn cast_vote(
        &self,
        cmd: CastVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        Ok(self.cast_vote.handle(cmd, metadata).await?.ballot)
    }

    /// Operator-triggered close. The timer uses the same path.
    pub async fn end_vote(
        &self,
        ballot_id: BallotId,
        metadata: CommandMetadata,
    ) -> Result<EndVoteResult, BallotError> {
        self.end_vote
            .handle(EndVoteCommand { ballot_id }, metadata)
            .await
    }

    pub async fn apply_ballot(
        &self,
        ballot_id: BallotId,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        self.apply_ballot
            .handle(ApplyBallotCommand { ballot_id }, metadata)
            .await
    }

    pub async fn cancel_ballot(
        &self,
        ballot_id: BallotId,
        metadata: CommandMetadata,
    ) -> Result<Ballot, BallotError> {
        self.cancel_ballot
            .handle(CancelBallotCommand { ballot_id }, metadata)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ballot queries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn evaluate_decision(&self, ballot_id: BallotId) -> Result<Decision, BallotError> {
        self.evaluate_decision
            .handle(EvaluateDecisionQuery { ballot_id })
            .await
    }

    pub async fn get_ballot(&self, ballot_id: BallotId) -> Result<Ballot, BallotError> {
        self.get_ballot.handle(GetBallotQuery { ballot_id }).await
    }

    pub async fn active_ballot(
        &self,
        agenda_item_id: AgendaItemId,
    ) -> Result<Option<Ballot>, BallotError> {
        self.active_ballot
            .handle(ActiveBallotQuery { agenda_item_id })
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status commands
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn change_meeting_status(
        &self,
        cmd: ChangeMeetingStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<Meeting, MeetingError> {
        self.change_meeting_status.handle(cmd, metadata).await
    }

    pub async fn set_active_agenda_item(
        &self,
        cmd: SetActiveAgendaItemCommand,
        metadata: CommandMetadata,
    ) -> Result<Meeting, MeetingError> {
        self.set_active_agenda_item.handle(cmd, metadata).await
    }

    pub async fn change_user_status(
        &self,
        cmd: ChangeUserStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<(), MeetingError> {
        self.change_user_status.handle(cmd, metadata).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Close timers currently armed or fired but not yet handled.
    pub fn armed_timers(&self) -> usize {
        self.timer.armed_count()
    }

    /// Stops the close worker after its in-flight closes finish.
    ///
    /// Ballots still PENDING keep their status; nothing closes them until
    /// an operator ends them.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "close worker panicked");
        }
        tracing::info!(armed = self.timer.armed_count(), "vote engine stopped");
    }
}

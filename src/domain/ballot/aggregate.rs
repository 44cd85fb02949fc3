//! Ballot aggregate entity.
//!
//! A ballot is one timed voting round on a single agenda item. It carries
//! the counts, its own copy of the decision procedure and the decision
//! label once closed.
//!
//! # Ownership
//!
//! Casts are stored alongside the ballot by the repository; the ballot
//! only holds the derived counts. Counts are always replaced wholesale by
//! a recount, never incremented.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    AgendaItemId, BallotId, DomainError, ErrorCode, MeetingId, StateMachine, Timestamp,
    ValidationError,
};
use crate::domain::procedure::{DecisionLabel, VoteProcedure};
use crate::domain::tally::{Tally, TallySnapshot};

use super::BallotStatus;

/// Maximum length for the question put to the vote.
pub const MAX_QUESTION_LENGTH: usize = 2000;

/// Whether individual choices are attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    /// Choices are recorded against the voter's name.
    #[default]
    Open,
    /// Only counts are shown.
    Secret,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Open => write!(f, "OPEN"),
            VoteType::Secret => write!(f, "SECRET"),
        }
    }
}

/// Ballot aggregate.
///
/// # Invariants
///
/// - `for + against + abstain + absent == total_participants` after every
///   recount
/// - `duration_secs > 0`
/// - `decision` is only ever set by `close`, and cleared by `cancel`
/// - status only moves forward (see [`BallotStatus`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    id: BallotId,
    agenda_item_id: AgendaItemId,
    meeting_id: MeetingId,
    question: String,
    duration_secs: u64,
    vote_type: VoteType,
    procedure: Option<VoteProcedure>,
    #[serde(flatten)]
    tally: Tally,
    total_participants: u32,
    total_online: u32,
    status: BallotStatus,
    decision: Option<DecisionLabel>,
    created_at: Timestamp,
    closes_at: Timestamp,
    ended_at: Option<Timestamp>,
    updated_at: Timestamp,
}

impl Ballot {
    /// Opens a new ballot with every cohort member counted absent.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the question is blank
    /// - `OutOfRange` if the question is too long or the duration is zero
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        agenda_item_id: AgendaItemId,
        meeting_id: MeetingId,
        question: impl Into<String>,
        duration_secs: u64,
        vote_type: VoteType,
        procedure: Option<VoteProcedure>,
        snapshot: TallySnapshot,
    ) -> Result<Self, ValidationError> {
        let question = question.into();
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        if trimmed.len() > MAX_QUESTION_LENGTH {
            return Err(ValidationError::out_of_range(
                "question",
                1,
                MAX_QUESTION_LENGTH as i64,
                trimmed.len() as i64,
            ));
        }
        if duration_secs == 0 {
            return Err(ValidationError::out_of_range(
                "duration_secs",
                1,
                i64::MAX,
                0,
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: BallotId::new(),
            agenda_item_id,
            meeting_id,
            question: trimmed.to_string(),
            duration_secs,
            vote_type,
            procedure,
            tally: snapshot.tally,
            total_participants: snapshot.total_participants,
            total_online: snapshot.total_online,
            status: BallotStatus::Pending,
            decision: None,
            created_at: now,
            closes_at: now.plus_secs(duration_secs),
            ended_at: None,
            updated_at: now,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> BallotId {
        self.id
    }

    pub fn agenda_item_id(&self) -> AgendaItemId {
        self.agenda_item_id
    }

    pub fn meeting_id(&self) -> MeetingId {
        self.meeting_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn vote_type(&self) -> VoteType {
        self.vote_type
    }

    /// The procedure copy taken when the ballot opened.
    pub fn procedure(&self) -> Option<&VoteProcedure> {
        self.procedure.as_ref()
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Counts plus the cohort figures of the last recount.
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot::new(self.total_participants, self.total_online, self.tally)
    }

    pub fn status(&self) -> BallotStatus {
        self.status
    }

    pub fn decision(&self) -> Option<DecisionLabel> {
        self.decision
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// When the close timer is due.
    pub fn closes_at(&self) -> &Timestamp {
        &self.closes_at
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Ensures the ballot is still open for casts.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the ballot is PENDING
    pub fn ensure_accepts_casts(&self) -> Result<(), DomainError> {
        if self.status.accepts_casts() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Ballot {} is {} and no longer accepts votes", self.id, self.status),
            ))
        }
    }

    /// Replaces the counts with a fresh recount while voting is open.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the ballot is PENDING
    pub fn record_tally(&mut self, snapshot: TallySnapshot) -> Result<(), DomainError> {
        self.ensure_accepts_casts()?;
        self.apply_snapshot(snapshot);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Freezes the final counts and records the decision.
    ///
    /// `decision` is `None` when the procedure is absent or could not be
    /// evaluated.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the ballot is PENDING
    pub fn close(
        &mut self,
        snapshot: TallySnapshot,
        decision: Option<DecisionLabel>,
    ) -> Result<(), DomainError> {
        self.status = self.status.transition_to(BallotStatus::Ended)?;
        self.apply_snapshot(snapshot);
        self.decision = decision;

        let now = Timestamp::now();
        self.ended_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Makes the decision permanent.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the ballot is ENDED
    pub fn apply(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(BallotStatus::Applied)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Discards the ballot and any decision.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already APPLIED or CANCELLED
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(BallotStatus::Cancelled)?;
        self.decision = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: TallySnapshot) {
        self.tally = snapshot.tally;
        self.total_participants = snapshot.total_participants;
        self.total_online = snapshot.total_online;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(participants: u32, for_count: u32, against: u32) -> TallySnapshot {
        TallySnapshot::new(
            participants,
            participants,
            Tally {
                for_count,
                against,
                abstain: 0,
                absent: participants - for_count - against,
            },
        )
    }

    fn open_ballot() -> Ballot {
        Ballot::start(
            AgendaItemId::new(),
            MeetingId::new(),
            "Утвердить повестку",
            5,
            VoteType::Open,
            Some(VoteProcedure::simple_majority()),
            TallySnapshot::new(10, 8, Tally::all_absent(10)),
        )
        .unwrap()
    }

    #[test]
    fn start_counts_everyone_absent() {
        let ballot = open_ballot();

        assert_eq!(ballot.status(), BallotStatus::Pending);
        assert_eq!(ballot.tally().absent, 10);
        assert_eq!(ballot.tally().total(), 10);
        assert_eq!(ballot.snapshot().total_online, 8);
        assert!(ballot.decision().is_none());
        assert!(ballot.ended_at().is_none());
    }

    #[test]
    fn start_schedules_close_after_duration() {
        let ballot = open_ballot();
        let delta = ballot.closes_at().duration_since(ballot.created_at());
        assert_eq!(delta.num_seconds(), 5);
    }

    #[test]
    fn start_rejects_blank_question() {
        let result = Ballot::start(
            AgendaItemId::new(),
            MeetingId::new(),
            "   ",
            5,
            VoteType::Open,
            None,
            TallySnapshot::default(),
        );
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn start_rejects_zero_duration() {
        let result = Ballot::start(
            AgendaItemId::new(),
            MeetingId::new(),
            "Вопрос",
            0,
            VoteType::Secret,
            None,
            TallySnapshot::default(),
        );
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn record_tally_replaces_counts_while_pending() {
        let mut ballot = open_ballot();
        ballot.record_tally(snapshot(10, 3, 1)).unwrap();
        assert_eq!(ballot.tally().for_count, 3);
        assert_eq!(ballot.tally().absent, 6);
    }

    #[test]
    fn close_freezes_counts_and_sets_decision() {
        let mut ballot = open_ballot();
        ballot
            .close(snapshot(10, 6, 2), Some(DecisionLabel::Accepted))
            .unwrap();

        assert_eq!(ballot.status(), BallotStatus::Ended);
        assert_eq!(ballot.decision(), Some(DecisionLabel::Accepted));
        assert_eq!(ballot.tally().absent, 2);
        assert!(ballot.ended_at().is_some());
        assert!(ballot.record_tally(snapshot(10, 7, 2)).is_err());
    }

    #[test]
    fn close_twice_fails() {
        let mut ballot = open_ballot();
        ballot.close(snapshot(10, 0, 0), None).unwrap();
        let err = ballot.close(snapshot(10, 0, 0), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn apply_requires_ended() {
        let mut ballot = open_ballot();
        assert!(ballot.apply().is_err());

        ballot.close(snapshot(10, 6, 2), Some(DecisionLabel::Accepted)).unwrap();
        ballot.apply().unwrap();

        assert_eq!(ballot.status(), BallotStatus::Applied);
        assert_eq!(ballot.decision(), Some(DecisionLabel::Accepted));
        assert!(ballot.ensure_accepts_casts().is_err());
    }

    #[test]
    fn cancel_discards_decision() {
        let mut ballot = open_ballot();
        ballot.close(snapshot(10, 6, 2), Some(DecisionLabel::Accepted)).unwrap();
        ballot.cancel().unwrap();

        assert_eq!(ballot.status(), BallotStatus::Cancelled);
        assert!(ballot.decision().is_none());
        assert!(ballot.cancel().is_err());
    }

    #[test]
    fn serializes_counts_at_top_level() {
        let ballot = open_ballot();
        let value = serde_json::to_value(&ballot).unwrap();

        assert_eq!(value["for"], json!(0));
        assert_eq!(value["absent"], json!(10));
        assert_eq!(value["status"], json!("PENDING"));
        assert_eq!(value["voteType"], json!("OPEN"));
        assert!(value["decision"].is_null());
    }
}

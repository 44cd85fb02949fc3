//! Meeting and agenda item entities.
//!
//! Both are owned by the external store; the vote engine reads them and
//! updates the few fields the voting lifecycle touches (voting flag, active
//! item, decision history, meeting status).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AgendaItemId, BallotId, DivisionId, DomainError, ErrorCode, MeetingId, StateMachine,
    Timestamp,
};
use crate::domain::procedure::DecisionLabel;

use super::MeetingStatus;

/// A meeting and the divisions whose members may vote in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    id: MeetingId,
    name: String,
    status: MeetingStatus,
    division_ids: Vec<DivisionId>,
    active_agenda_item_id: Option<AgendaItemId>,
    updated_at: Timestamp,
}

impl Meeting {
    pub fn new(name: impl Into<String>, division_ids: Vec<DivisionId>) -> Self {
        Self {
            id: MeetingId::new(),
            name: name.into(),
            status: MeetingStatus::Waiting,
            division_ids,
            active_agenda_item_id: None,
            updated_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> MeetingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> MeetingStatus {
        self.status
    }

    pub fn division_ids(&self) -> &[DivisionId] {
        &self.division_ids
    }

    pub fn has_divisions(&self) -> bool {
        !self.division_ids.is_empty()
    }

    pub fn active_agenda_item_id(&self) -> Option<AgendaItemId> {
        self.active_agenda_item_id
    }

    /// Moves the meeting to `target`, returning the previous status.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the move is not allowed
    pub fn change_status(&mut self, target: MeetingStatus) -> Result<MeetingStatus, DomainError> {
        let previous = self.status;
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(previous)
    }

    /// Selects the item shown on every screen, returning the previous one.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the meeting is completed
    pub fn set_active_agenda_item(
        &mut self,
        agenda_item_id: Option<AgendaItemId>,
    ) -> Result<Option<AgendaItemId>, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Meeting {} is completed", self.id),
            ));
        }
        let previous = std::mem::replace(&mut self.active_agenda_item_id, agenda_item_id);
        self.updated_at = Timestamp::now();
        Ok(previous)
    }
}

/// A decision recorded when a ballot is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDecision {
    pub ballot_id: BallotId,
    pub decision: Option<DecisionLabel>,
    pub recorded_at: Timestamp,
}

/// One item on a meeting's agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    id: AgendaItemId,
    meeting_id: MeetingId,
    title: String,
    voting: bool,
    decisions: Vec<RecordedDecision>,
}

impl AgendaItem {
    pub fn new(meeting_id: MeetingId, title: impl Into<String>) -> Self {
        Self {
            id: AgendaItemId::new(),
            meeting_id,
            title: title.into(),
            voting: false,
            decisions: Vec::new(),
        }
    }

    pub fn id(&self) -> AgendaItemId {
        self.id
    }

    pub fn meeting_id(&self) -> MeetingId {
        self.meeting_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// True while a ballot on this item is PENDING or ENDED.
    pub fn is_voting(&self) -> bool {
        self.voting
    }

    /// Applied decisions, oldest first.
    pub fn decisions(&self) -> &[RecordedDecision] {
        &self.decisions
    }

    pub fn mark_voting(&mut self) {
        self.voting = true;
    }

    pub fn mark_not_voting(&mut self) {
        self.voting = false;
    }

    /// Appends an applied decision and ends voting.
    pub fn record_decision(&mut self, ballot_id: BallotId, decision: Option<DecisionLabel>) {
        self.decisions.push(RecordedDecision {
            ballot_id,
            decision,
            recorded_at: Timestamp::now(),
        });
        self.voting = false;
    }
}

//! In-memory meeting, agenda item and procedure storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AgendaItemId, DomainError, ErrorCode, MeetingId, ProcedureId};
use crate::domain::meeting::{AgendaItem, Meeting};
use crate::domain::procedure::VoteProcedure;
use crate::ports::{MeetingRepository, ProcedureRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryMeetingStore {
    meetings: Arc<RwLock<HashMap<MeetingId, Meeting>>>,
    agenda_items: Arc<RwLock<HashMap<AgendaItemId, AgendaItem>>>,
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a meeting (the engine never creates meetings itself).
    pub async fn insert_meeting(&self, meeting: Meeting) {
        self.meetings.write().await.insert(meeting.id(), meeting);
    }

    pub async fn insert_agenda_item(&self, item: AgendaItem) {
        self.agenda_items.write().await.insert(item.id(), item);
    }
}

#[async_trait]
impl MeetingRepository for InMemoryMeetingStore {
    async fn find_meeting(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError> {
        Ok(self.meetings.read().await.get(id).cloned())
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<(), DomainError> {
        let mut meetings = self.meetings.write().await;
        let stored = meetings.get_mut(&meeting.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::MeetingNotFound,
                format!("Meeting not found: {}", meeting.id()),
            )
        })?;
        *stored = meeting.clone();
        Ok(())
    }

    async fn find_agenda_item(&self, id: &AgendaItemId) -> Result<Option<AgendaItem>, DomainError> {
        Ok(self.agenda_items.read().await.get(id).cloned())
    }

    async fn update_agenda_item(&self, item: &AgendaItem) -> Result<(), DomainError> {
        let mut items = self.agenda_items.write().await;
        let stored = items.get_mut(&item.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::AgendaItemNotFound,
                format!("Agenda item not found: {}", item.id()),
            )
        })?;
        *stored = item.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProcedureStore {
    procedures: Arc<RwLock<HashMap<ProcedureId, VoteProcedure>>>,
}

impl InMemoryProcedureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a procedure.
    pub async fn insert(&self, procedure: VoteProcedure) {
        self.procedures.write().await.insert(procedure.id, procedure);
    }
}

#[async_trait]
impl ProcedureRepository for InMemoryProcedureStore {
    async fn find_by_id(&self, id: &ProcedureId) -> Result<Option<VoteProcedure>, DomainError> {
        Ok(self.procedures.read().await.get(id).cloned())
    }
}

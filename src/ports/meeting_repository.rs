//! Meeting repository port.
//!
//! Meetings and agenda items are owned by the external store; the engine
//! reads them and writes back the voting flag, active item and status.

use async_trait::async_trait;

use crate::domain::foundation::{AgendaItemId, DomainError, MeetingId};
use crate::domain::meeting::{AgendaItem, Meeting};

#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Returns `None` if not found.
    async fn find_meeting(&self, id: &MeetingId) -> Result<Option<Meeting>, DomainError>;

    /// # Errors
    ///
    /// - `MeetingNotFound` if the meeting doesn't exist
    async fn update_meeting(&self, meeting: &Meeting) -> Result<(), DomainError>;

    /// Returns `None` if not found.
    async fn find_agenda_item(&self, id: &AgendaItemId) -> Result<Option<AgendaItem>, DomainError>;

    /// # Errors
    ///
    /// - `AgendaItemNotFound` if the item doesn't exist
    async fn update_agenda_item(&self, item: &AgendaItem) -> Result<(), DomainError>;
}

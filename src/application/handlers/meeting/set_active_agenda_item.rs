//! SetActiveAgendaItemHandler - Selects the agenda item shown on every screen.

use std::sync::Arc;

use crate::domain::foundation::{AgendaItemId, CommandMetadata, EventId, MeetingId, Timestamp};
use crate::domain::meeting::{ActiveAgendaItemChanged, Meeting, MeetingError};
use crate::ports::{EventPublisher, MeetingRepository};

use super::super::publish::publish_event;

/// `agenda_item_id: None` clears the selection.
#[derive(Debug, Clone)]
pub struct SetActiveAgendaItemCommand {
    pub meeting_id: MeetingId,
    pub agenda_item_id: Option<AgendaItemId>,
}

pub struct SetActiveAgendaItemHandler {
    meetings: Arc<dyn MeetingRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SetActiveAgendaItemHandler {
    pub fn new(
        meetings: Arc<dyn MeetingRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            meetings,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SetActiveAgendaItemCommand,
        metadata: CommandMetadata,
    ) -> Result<Meeting, MeetingError> {
        // 1. Load the meeting
        let mut meeting = self
            .meetings
            .find_meeting(&cmd.meeting_id)
            .await?
            .ok_or(MeetingError::MeetingNotFound(cmd.meeting_id))?;

        // 2. The item must exist and belong to this meeting
        if let Some(agenda_item_id) = cmd.agenda_item_id {
            let item = self
                .meetings
                .find_agenda_item(&agenda_item_id)
                .await?
                .ok_or(MeetingError::AgendaItemNotFound(agenda_item_id))?;
            if item.meeting_id() != meeting.id() {
                return Err(MeetingError::ForeignAgendaItem {
                    meeting_id: meeting.id(),
                    agenda_item_id,
                });
            }
        }

        // 3. Switch and persist
        let previous = meeting.set_active_agenda_item(cmd.agenda_item_id)?;
        self.meetings.update_meeting(&meeting).await?;

        tracing::info!(
            meeting_id = %meeting.id(),
            agenda_item_id = ?cmd.agenda_item_id,
            "active agenda item changed"
        );

        // 4. Publish
        let event = ActiveAgendaItemChanged {
            event_id: EventId::new(),
            meeting_id: meeting.id(),
            previous_agenda_item_id: previous,
            agenda_item_id: cmd.agenda_item_id,
            changed_at: Timestamp::now(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(meeting)
    }
}

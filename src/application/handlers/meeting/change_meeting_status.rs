//! ChangeMeetingStatusHandler - Moves a meeting between WAITING, ACTIVE and COMPLETED.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, EventId, MeetingId, Timestamp};
use crate::domain::meeting::{Meeting, MeetingError, MeetingStatus, MeetingStatusChanged};
use crate::ports::{EventPublisher, MeetingRepository};

use super::super::publish::publish_event;

#[derive(Debug, Clone)]
pub struct ChangeMeetingStatusCommand {
    pub meeting_id: MeetingId,
    pub status: MeetingStatus,
}

pub struct ChangeMeetingStatusHandler {
    meetings: Arc<dyn MeetingRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ChangeMeetingStatusHandler {
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
        cmd: ChangeMeetingStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<Meeting, MeetingError> {
        // 1. Load
        let mut meeting = self
            .meetings
            .find_meeting(&cmd.meeting_id)
            .await?
            .ok_or(MeetingError::MeetingNotFound(cmd.meeting_id))?;

        // 2. Transition and persist
        let old_status = meeting.change_status(cmd.status)?;
        self.meetings.update_meeting(&meeting).await?;

        tracing::info!(
            meeting_id = %meeting.id(),
            from = ?old_status,
            to = ?meeting.status(),
            "meeting status changed"
        );

        // 3. Publish
        let event = MeetingStatusChanged {
            event_id: EventId::new(),
            meeting_id: meeting.id(),
            old_status,
            new_status: meeting.status(),
            changed_at: Timestamp::now(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(meeting)
    }
}

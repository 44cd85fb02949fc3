//! ChangeUserStatusHandler - Records a participant going online or offline.
//!
//! Presence feeds `total_online` on the next recount of every open ballot.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, ErrorCode, EventId, Timestamp, UserId};
use crate::domain::meeting::{MeetingError, UserStatus, UserStatusChanged};
use crate::ports::{EventPublisher, ParticipantDirectory};

use super::super::publish::publish_event;

#[derive(Debug, Clone)]
pub struct ChangeUserStatusCommand {
    pub user_id: UserId,
    pub status: UserStatus,
}

pub struct ChangeUserStatusHandler {
    directory: Arc<dyn ParticipantDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ChangeUserStatusHandler {
    pub fn new(
        directory: Arc<dyn ParticipantDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            directory,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ChangeUserStatusCommand,
        metadata: CommandMetadata,
    ) -> Result<(), MeetingError> {
        self.directory
            .set_status(&cmd.user_id, cmd.status)
            .await
            .map_err(|e| match e.code {
                ErrorCode::UserNotFound => MeetingError::UserNotFound(cmd.user_id.clone()),
                _ => MeetingError::from(e),
            })?;

        tracing::debug!(user_id = %cmd.user_id, status = ?cmd.status, "user status changed");

        let event = UserStatusChanged {
            event_id: EventId::new(),
            user_id: cmd.user_id,
            status: cmd.status,
            changed_at: Timestamp::now(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &metadata).await;

        Ok(())
    }
}

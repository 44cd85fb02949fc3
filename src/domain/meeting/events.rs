//! Meeting and participant status events.
//!
//! Not part of the ballot lifecycle, but published through the same bus so
//! every screen follows meeting state from one subscription.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, AgendaItemId, EventId, MeetingId, Timestamp, UserId};

use super::{MeetingStatus, UserStatus};

// ════════════════════════════════════════════════════════════════════════════
// MeetingStatusChanged
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingStatusChanged {
    pub event_id: EventId,
    pub meeting_id: MeetingId,
    pub old_status: MeetingStatus,
    pub new_status: MeetingStatus,
    pub changed_at: Timestamp,
}

domain_event!(
    MeetingStatusChanged,
    event_type = "meeting.status_changed",
    aggregate_id = meeting_id,
    aggregate_type = "Meeting",
    occurred_at = changed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ActiveAgendaItemChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when the operator switches the item shown on screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAgendaItemChanged {
    pub event_id: EventId,
    pub meeting_id: MeetingId,
    pub previous_agenda_item_id: Option<AgendaItemId>,
    pub agenda_item_id: Option<AgendaItemId>,
    pub changed_at: Timestamp,
}

domain_event!(
    ActiveAgendaItemChanged,
    event_type = "agenda.active_item_changed",
    aggregate_id = meeting_id,
    aggregate_type = "Meeting",
    occurred_at = changed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// UserStatusChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when a participant connects or disconnects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusChanged {
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: UserStatus,
    pub changed_at: Timestamp,
}

domain_event!(
    UserStatusChanged,
    event_type = "user.status_changed",
    aggregate_id = user_id,
    aggregate_type = "User",
    occurred_at = changed_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, SerializableDomainEvent};

    #[test]
    fn user_status_event_is_keyed_by_user() {
        let event = UserStatusChanged {
            event_id: EventId::new(),
            user_id: UserId::new("delegate-7").unwrap(),
            status: UserStatus::Online,
            changed_at: Timestamp::now(),
        };

        assert_eq!(event.aggregate_id(), "delegate-7");
        assert_eq!(event.event_type(), "user.status_changed");
    }

    #[test]
    fn active_item_event_serializes_nulls() {
        let event = ActiveAgendaItemChanged {
            event_id: EventId::new(),
            meeting_id: MeetingId::new(),
            previous_agenda_item_id: None,
            agenda_item_id: None,
            changed_at: Timestamp::now(),
        };

        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.aggregate_type, "Meeting");
        assert!(envelope.payload["agenda_item_id"].is_null());
    }
}

//! Compensation for multi-record writes.
//!
//! Handlers write the agenda item before the ballot. When the ballot write
//! then fails, the item is put back so neither record reflects the command.

use crate::domain::meeting::AgendaItem;
use crate::ports::MeetingRepository;

/// Writes back an agenda item as it was before the failed command.
pub(super) async fn restore_agenda_item(meetings: &dyn MeetingRepository, previous: &AgendaItem) {
    if let Err(e) = meetings.update_agenda_item(previous).await {
        tracing::error!(
            agenda_item_id = %previous.id(),
            error = %e,
            "agenda item could not be restored after failed ballot write"
        );
    }
}

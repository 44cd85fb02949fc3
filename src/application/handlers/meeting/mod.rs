//! Meeting and participant status handlers.

mod change_meeting_status;
mod change_user_status;
mod set_active_agenda_item;

pub use change_meeting_status::{ChangeMeetingStatusCommand, ChangeMeetingStatusHandler};
pub use change_user_status::{ChangeUserStatusCommand, ChangeUserStatusHandler};
pub use set_active_agenda_item::{SetActiveAgendaItemCommand, SetActiveAgendaItemHandler};

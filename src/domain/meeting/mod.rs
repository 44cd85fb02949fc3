//! Meeting module - the slice of meeting state the vote engine touches.

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::{AgendaItem, Meeting, RecordedDecision};
pub use errors::MeetingError;
pub use events::{ActiveAgendaItemChanged, MeetingStatusChanged, UserStatusChanged};
pub use status::{MeetingStatus, UserStatus};

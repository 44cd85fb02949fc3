//! Participant directory port.
//!
//! Answers "who may vote in this meeting right now". The cohort is the set
//! of non-administrative users in the meeting's divisions. It is read fresh
//! every time its size matters and never cached by the engine.

use async_trait::async_trait;

use crate::domain::foundation::{DivisionId, DomainError, UserId};
use crate::domain::meeting::UserStatus;
use crate::domain::tally::Cohort;

#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Current cohort for the given divisions, administrators excluded.
    async fn cohort(&self, division_ids: &[DivisionId]) -> Result<Cohort, DomainError>;

    /// Records a participant's connection status.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user is unknown
    async fn set_status(&self, user_id: &UserId, status: UserStatus) -> Result<(), DomainError>;
}

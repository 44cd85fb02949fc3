//! Procedure repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProcedureId};
use crate::domain::procedure::VoteProcedure;

/// Read access to stored decision procedures.
///
/// Ballots copy the procedure at start, so later edits here never affect
/// a ballot in progress.
#[async_trait]
pub trait ProcedureRepository: Send + Sync {
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &ProcedureId) -> Result<Option<VoteProcedure>, DomainError>;
}

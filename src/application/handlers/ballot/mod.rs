//! Ballot command and query handlers.

mod apply_ballot;
mod cancel_ballot;
mod cast_vote;
mod end_vote;
mod evaluate_decision;
mod get_ballot;
mod policy;
mod rollback;
mod start_vote;

#[cfg(test)]
pub(crate) mod test_support;

use rollback::restore_agenda_item;

pub use apply_ballot::{ApplyBallotCommand, ApplyBallotHandler};
pub use cancel_ballot::{CancelBallotCommand, CancelBallotHandler};
pub use cast_vote::{CastVoteCommand, CastVoteHandler, CastVoteResult};
pub use end_vote::{EndVoteCommand, EndVoteHandler, EndVoteResult, CLOSE_RETRY_DELAY};
pub use evaluate_decision::{EvaluateDecisionHandler, EvaluateDecisionQuery};
pub use get_ballot::{ActiveBallotHandler, ActiveBallotQuery, GetBallotHandler, GetBallotQuery};
pub use policy::VotingPolicy;
pub use start_vote::{StartVoteCommand, StartVoteHandler, StartVoteResult};

//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod ballot;
pub mod meeting;
mod publish;

pub use ballot::{
    ActiveBallotHandler, ActiveBallotQuery, ApplyBallotCommand, ApplyBallotHandler,
    CancelBallotCommand, CancelBallotHandler, CastVoteCommand, CastVoteHandler, CastVoteResult,
    EndVoteCommand, EndVoteHandler, EndVoteResult, EvaluateDecisionHandler,
    EvaluateDecisionQuery, GetBallotHandler, GetBallotQuery, StartVoteCommand, StartVoteHandler,
    StartVoteResult, VotingPolicy,
};
pub use meeting::{
    ChangeMeetingStatusCommand, ChangeMeetingStatusHandler, ChangeUserStatusCommand,
    ChangeUserStatusHandler, SetActiveAgendaItemCommand, SetActiveAgendaItemHandler,
};

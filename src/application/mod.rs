//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands mutate ballots or meeting state under per-ballot locks and
//! publish afterwards; queries read straight from the store.

mod close_worker;
mod engine;
pub mod handlers;
pub mod locks;

pub use close_worker::CloseWorker;
pub use engine::{EnginePorts, VoteEngine};
pub use handlers::{
    ActiveBallotHandler, ActiveBallotQuery, ApplyBallotCommand, ApplyBallotHandler,
    CancelBallotCommand, CancelBallotHandler, CastVoteCommand, CastVoteHandler, CastVoteResult,
    ChangeMeetingStatusCommand, ChangeMeetingStatusHandler, ChangeUserStatusCommand,
    ChangeUserStatusHandler, EndVoteCommand, EndVoteHandler, EndVoteResult,
    EvaluateDecisionHandler, EvaluateDecisionQuery, GetBallotHandler, GetBallotQuery,
    SetActiveAgendaItemCommand, SetActiveAgendaItemHandler, StartVoteCommand, StartVoteHandler,
    StartVoteResult, VotingPolicy,
};
pub use locks::{KeyedLocks, VoteLocks};

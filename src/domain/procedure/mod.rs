//! Procedure module - decision procedures and the expression evaluator.
//!
//! A procedure is an ordered list of condition blocks. Each block holds an
//! infix expression over tally counters, literals and operators; the
//! evaluator reduces the blocks to one boolean and maps it to a label.

mod definition;
mod element;
mod errors;
mod evaluator;

pub use definition::{ConditionBlock, Decision, DecisionLabel, VoteProcedure, MAX_NAME_LENGTH};
pub use element::{BinaryOp, Counter, Element, Literal, LiteralKind, LogicalOp, Symbol};
pub use errors::EvaluationError;
pub use evaluator::ExpressionEvaluator;

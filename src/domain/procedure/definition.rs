//! Decision procedures: ordered condition blocks plus the label they award.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ProcedureId, ValidationError};
use crate::domain::tally::TallySnapshot;

use super::{Element, EvaluationError, ExpressionEvaluator, LogicalOp};

/// Maximum length for a procedure name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Outcome label attached to an ended ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionLabel {
    #[serde(rename = "Принято")]
    Accepted,
    #[serde(rename = "Не принято")]
    Rejected,
}

impl DecisionLabel {
    /// The other label.
    pub fn complement(&self) -> Self {
        match self {
            DecisionLabel::Accepted => DecisionLabel::Rejected,
            DecisionLabel::Rejected => DecisionLabel::Accepted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DecisionLabel::Accepted => "Принято",
            DecisionLabel::Rejected => "Не принято",
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of a procedure.
///
/// `operator` combines `elements` with `elements2` when the latter is
/// present, and also chains this block to the next one in the procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionBlock {
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<LogicalOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements2: Option<Vec<Element>>,
}

impl ConditionBlock {
    pub fn single(elements: Vec<Element>) -> Self {
        Self {
            elements,
            operator: None,
            elements2: None,
        }
    }

    pub fn combined(elements: Vec<Element>, operator: LogicalOp, elements2: Vec<Element>) -> Self {
        Self {
            elements,
            operator: Some(operator),
            elements2: Some(elements2),
        }
    }

    /// Builder: set the operator that chains this block to the next.
    pub fn then(mut self, operator: LogicalOp) -> Self {
        self.operator = Some(operator);
        self
    }
}

/// Result of evaluating a whole procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub met: bool,
    pub label: DecisionLabel,
}

/// A named decision procedure.
///
/// Ballots keep their own copy taken at start, so edits to the stored
/// procedure never reach a ballot in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteProcedure {
    pub id: ProcedureId,
    pub name: String,
    pub conditions: Vec<ConditionBlock>,
    pub result_if_true: DecisionLabel,
}

impl VoteProcedure {
    pub fn new(
        name: impl Into<String>,
        conditions: Vec<ConditionBlock>,
        result_if_true: DecisionLabel,
    ) -> Self {
        Self {
            id: ProcedureId::new(),
            name: name.into(),
            conditions,
            result_if_true,
        }
    }

    /// Simple majority: more votes for than against.
    pub fn simple_majority() -> Self {
        Self::new(
            "Простое большинство",
            vec![ConditionBlock::single(vec![
                Element::counter(super::Counter::For),
                Element::op(super::BinaryOp::Gt),
                Element::counter(super::Counter::Against),
            ])],
            DecisionLabel::Accepted,
        )
    }

    /// Structural validation, run before a ballot may reference the procedure.
    ///
    /// Checks the name, that there is at least one block, that chaining
    /// operators are present where needed, and that every expression is
    /// well-formed and reduces to a condition.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(ValidationError::out_of_range(
                "name",
                1,
                MAX_NAME_LENGTH as i64,
                self.name.len() as i64,
            ));
        }

        // An all-zero snapshot exercises structure only: no tally can be
        // inconsistent and every counter resolves.
        ExpressionEvaluator::evaluate_procedure(self, &TallySnapshot::default())
            .map(|_| ())
            .map_err(|e| match e {
                EvaluationError::InvalidProcedure(reason)
                | EvaluationError::MalformedExpression(reason) => {
                    ValidationError::invalid_format("conditions", reason)
                }
                other => ValidationError::invalid_format("conditions", other.to_string()),
            })
    }
}

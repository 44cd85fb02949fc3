//! Expression Evaluator - condition expressions over a live tally.
//!
//! A two-stack (operand/operator) shunting-yard evaluator. Binding, from
//! tightest to loosest: `* /`, `+ -`, comparisons, logical operators;
//! parentheses override. All operators are left-associative, so when an
//! operator arrives every stacked operator of equal or tighter binding is
//! reduced first. Arithmetic therefore collapses to a number before a
//! comparison sees it, and comparisons collapse to booleans before a
//! logical operator does.
//!
//! Each call owns its stacks; the evaluator is a pure function of
//! `(elements, tally)`.

use crate::domain::tally::TallySnapshot;

use super::{
    BinaryOp, ConditionBlock, Counter, Decision, Element, EvaluationError, Literal, LiteralKind,
    Symbol, VoteProcedure,
};

const EQ_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "condition",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Binary(BinaryOp),
    OpenParen,
}

/// Stateless evaluator for expressions and whole procedures.
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Evaluates one expression to a boolean.
    ///
    /// # Errors
    ///
    /// - `InconsistentTally` if the snapshot has more votes than participants
    /// - `MalformedExpression` on bad sequencing, unbalanced parentheses,
    ///   type mismatches, or a result that is not a condition
    pub fn evaluate(elements: &[Element], tally: &TallySnapshot) -> Result<bool, EvaluationError> {
        Self::ensure_consistent(tally)?;
        Self::evaluate_condition(elements, tally)
    }

    /// Evaluates every block of a procedure and folds them left-to-right.
    ///
    /// Each pair of adjacent blocks is combined by the operator of the
    /// earlier block; the last block's operator is not used for chaining.
    ///
    /// # Errors
    ///
    /// - `InvalidProcedure` for an empty condition list, an empty block, or
    ///   a missing combining operator
    /// - any error from [`ExpressionEvaluator::evaluate`]
    pub fn evaluate_procedure(
        procedure: &VoteProcedure,
        tally: &TallySnapshot,
    ) -> Result<Decision, EvaluationError> {
        Self::ensure_consistent(tally)?;

        let (first, rest) = procedure
            .conditions
            .split_first()
            .ok_or_else(|| EvaluationError::invalid_procedure("procedure has no conditions"))?;

        let mut met = Self::evaluate_block(first, tally)?;
        let mut previous = first;
        for (index, block) in rest.iter().enumerate() {
            let operator = previous.operator.ok_or_else(|| {
                EvaluationError::invalid_procedure(format!(
                    "condition {} has no operator to chain it to condition {}",
                    index + 1,
                    index + 2
                ))
            })?;
            met = operator.apply(met, Self::evaluate_block(block, tally)?);
            previous = block;
        }

        let label = if met {
            procedure.result_if_true
        } else {
            procedure.result_if_true.complement()
        };
        Ok(Decision { met, label })
    }

    fn ensure_consistent(tally: &TallySnapshot) -> Result<(), EvaluationError> {
        if tally.is_inconsistent() {
            return Err(EvaluationError::InconsistentTally {
                votes_cast: tally.votes_cast(),
                participants: tally.total_participants,
            });
        }
        Ok(())
    }

    fn evaluate_block(block: &ConditionBlock, tally: &TallySnapshot) -> Result<bool, EvaluationError> {
        if block.elements.is_empty() {
            return Err(EvaluationError::invalid_procedure("condition has no elements"));
        }
        let primary = Self::evaluate_condition(&block.elements, tally)?;

        match &block.elements2 {
            None => Ok(primary),
            Some(secondary) if secondary.is_empty() => Err(EvaluationError::invalid_procedure(
                "secondary expression has no elements",
            )),
            Some(secondary) => {
                let operator = block.operator.ok_or_else(|| {
                    EvaluationError::invalid_procedure("secondary expression without an operator")
                })?;
                Ok(operator.apply(primary, Self::evaluate_condition(secondary, tally)?))
            }
        }
    }

    fn evaluate_condition(elements: &[Element], tally: &TallySnapshot) -> Result<bool, EvaluationError> {
        match Self::reduce(elements, tally)? {
            Value::Bool(met) => Ok(met),
            Value::Number(_) => Err(EvaluationError::malformed(
                "expression yields a number, not a condition",
            )),
        }
    }

    fn reduce(elements: &[Element], tally: &TallySnapshot) -> Result<Value, EvaluationError> {
        let mut operands: Vec<Value> = Vec::with_capacity(elements.len());
        let mut operators: Vec<Pending> = Vec::new();
        let mut expect_operand = true;

        for (position, element) in elements.iter().enumerate() {
            match element {
                Element::Literal(_) | Element::Symbol(Symbol::Counter(_)) => {
                    if !expect_operand {
                        return Err(EvaluationError::malformed(format!(
                            "two operands in a row at position {}",
                            position
                        )));
                    }
                    operands.push(Value::Number(Self::resolve(element, tally)));
                    expect_operand = false;
                }
                Element::Symbol(Symbol::OpenParen) => {
                    if !expect_operand {
                        return Err(EvaluationError::malformed(format!(
                            "'(' follows an operand at position {}",
                            position
                        )));
                    }
                    operators.push(Pending::OpenParen);
                }
                Element::Symbol(Symbol::CloseParen) => {
                    if expect_operand {
                        return Err(EvaluationError::malformed(format!(
                            "')' where an operand was expected at position {}",
                            position
                        )));
                    }
                    loop {
                        match operators.pop() {
                            Some(Pending::Binary(op)) => Self::apply_top(op, &mut operands)?,
                            Some(Pending::OpenParen) => break,
                            None => {
                                return Err(EvaluationError::malformed(format!(
                                    "unbalanced ')' at position {}",
                                    position
                                )))
                            }
                        }
                    }
                }
                Element::Symbol(Symbol::Op(op)) => {
                    if expect_operand {
                        return Err(EvaluationError::malformed(format!(
                            "operator '{}' is missing its left operand at position {}",
                            Symbol::Op(*op),
                            position
                        )));
                    }
                    while let Some(Pending::Binary(top)) = operators.last().copied() {
                        if top.precedence() < op.precedence() {
                            break;
                        }
                        operators.pop();
                        Self::apply_top(top, &mut operands)?;
                    }
                    operators.push(Pending::Binary(*op));
                    expect_operand = true;
                }
            }
        }

        if expect_operand {
            return Err(EvaluationError::malformed(if elements.is_empty() {
                "empty expression"
            } else {
                "expression ends where an operand was expected"
            }));
        }

        while let Some(pending) = operators.pop() {
            match pending {
                Pending::Binary(op) => Self::apply_top(op, &mut operands)?,
                Pending::OpenParen => return Err(EvaluationError::malformed("unbalanced '('")),
            }
        }

        let result = operands
            .pop()
            .ok_or_else(|| EvaluationError::malformed("operand stack underflow"))?;
        if !operands.is_empty() {
            return Err(EvaluationError::malformed("operands left over after evaluation"));
        }
        Ok(result)
    }

    fn resolve(element: &Element, tally: &TallySnapshot) -> f64 {
        match element {
            Element::Literal(Literal {
                kind: LiteralKind::Input,
                value,
            }) => *value,
            Element::Literal(Literal {
                kind: LiteralKind::Percent,
                value,
            }) => value / 100.0 * f64::from(tally.total_participants),
            Element::Symbol(Symbol::Counter(counter)) => f64::from(match counter {
                Counter::TotalParticipants => tally.total_participants,
                Counter::TotalOnline => tally.total_online,
                Counter::TotalVotesCast => tally.votes_cast(),
                Counter::For => tally.tally.for_count,
                Counter::Against => tally.tally.against,
                Counter::Abstain => tally.tally.abstain,
                Counter::Absent => tally.tally.absent,
            }),
            // Only operands reach here.
            Element::Symbol(_) => 0.0,
        }
    }

    fn apply_top(op: BinaryOp, operands: &mut Vec<Value>) -> Result<(), EvaluationError> {
        let (Some(right), Some(left)) = (operands.pop(), operands.pop()) else {
            return Err(EvaluationError::malformed("operand stack underflow"));
        };
        operands.push(Self::apply(op, left, right)?);
        Ok(())
    }

    fn apply(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvaluationError> {
        let mismatch = || {
            EvaluationError::malformed(format!(
                "'{}' cannot combine a {} with a {}",
                Symbol::Op(op),
                left.kind(),
                right.kind()
            ))
        };

        match (op, left, right) {
            (BinaryOp::Logical(logical), Value::Bool(l), Value::Bool(r)) => {
                Ok(Value::Bool(logical.apply(l, r)))
            }
            (BinaryOp::Logical(_), _, _) => Err(mismatch()),
            (_, Value::Number(l), Value::Number(r)) => Ok(match op {
                BinaryOp::Mul => Value::Number(l * r),
                BinaryOp::Div => Value::Number(l / r),
                BinaryOp::Add => Value::Number(l + r),
                BinaryOp::Sub => Value::Number(l - r),
                BinaryOp::Gt => Value::Bool(l > r),
                BinaryOp::Lt => Value::Bool(l < r),
                BinaryOp::Ge => Value::Bool(l >= r),
                BinaryOp::Le => Value::Bool(l <= r),
                BinaryOp::Eq => Value::Bool((l - r).abs() < EQ_TOLERANCE),
                BinaryOp::Logical(_) => return Err(mismatch()),
            }),
            _ => Err(mismatch()),
        }
    }
}

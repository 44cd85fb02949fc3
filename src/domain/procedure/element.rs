//! Expression elements of a decision procedure.
//!
//! On the wire an element is either a bare string naming a symbol
//! (`"За"`, `">"`, `"("`) or a tagged literal (`{"type": "input", "value": 50}`).
//! Inside the crate both shapes are resolved once, through the symbol
//! table below, into the `Element` variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Tally-backed operands an expression can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalParticipants,
    TotalOnline,
    TotalVotesCast,
    For,
    Against,
    Abstain,
    Absent,
}

/// Binary operators, in three binding classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // arithmetic
    Mul,
    Div,
    Add,
    Sub,
    // comparison
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    // logical
    Logical(LogicalOp),
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div => 4,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le | BinaryOp::Eq => 2,
            BinaryOp::Logical(_) => 1,
        }
    }
}

/// Operators that combine two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Both true.
    And,
    /// Either true.
    Or,
    /// Exactly one true.
    Otherwise,
    /// Left true and right false.
    Except,
}

impl LogicalOp {
    pub fn apply(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOp::And => left && right,
            LogicalOp::Or => left || right,
            LogicalOp::Otherwise => left != right,
            LogicalOp::Except => left && !right,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogicalOp::And => "И",
            LogicalOp::Or => "ИЛИ",
            LogicalOp::Otherwise => "ИНАЧЕ",
            LogicalOp::Except => "КРОМЕ",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogicalOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Symbol::from_str(s)? {
            Symbol::Op(BinaryOp::Logical(op)) => Ok(op),
            _ => Err(ValidationError::invalid_format(
                "operator",
                format!("'{}' is not a logical operator", s),
            )),
        }
    }
}

impl Serialize for LogicalOp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for LogicalOp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Every non-literal token of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Counter(Counter),
    OpenParen,
    CloseParen,
    Op(BinaryOp),
}

/// Symbol table: wire label -> symbol. The first label of each symbol is
/// the canonical one used when serializing.
const SYMBOL_TABLE: &[(&str, Symbol)] = &[
    ("Все пользователи заседания", Symbol::Counter(Counter::TotalParticipants)),
    ("Пользователи онлайн", Symbol::Counter(Counter::TotalOnline)),
    ("Всего голосов", Symbol::Counter(Counter::TotalVotesCast)),
    ("За", Symbol::Counter(Counter::For)),
    ("Против", Symbol::Counter(Counter::Against)),
    ("Воздержались", Symbol::Counter(Counter::Abstain)),
    ("Не голосовали", Symbol::Counter(Counter::Absent)),
    ("(", Symbol::OpenParen),
    (")", Symbol::CloseParen),
    ("*", Symbol::Op(BinaryOp::Mul)),
    ("/", Symbol::Op(BinaryOp::Div)),
    ("+", Symbol::Op(BinaryOp::Add)),
    ("-", Symbol::Op(BinaryOp::Sub)),
    (">=", Symbol::Op(BinaryOp::Ge)),
    ("<=", Symbol::Op(BinaryOp::Le)),
    (">", Symbol::Op(BinaryOp::Gt)),
    ("<", Symbol::Op(BinaryOp::Lt)),
    ("=", Symbol::Op(BinaryOp::Eq)),
    ("И", Symbol::Op(BinaryOp::Logical(LogicalOp::And))),
    ("AND", Symbol::Op(BinaryOp::Logical(LogicalOp::And))),
    ("ИЛИ", Symbol::Op(BinaryOp::Logical(LogicalOp::Or))),
    ("OR", Symbol::Op(BinaryOp::Logical(LogicalOp::Or))),
    ("ИНАЧЕ", Symbol::Op(BinaryOp::Logical(LogicalOp::Otherwise))),
    ("XOR", Symbol::Op(BinaryOp::Logical(LogicalOp::Otherwise))),
    ("КРОМЕ", Symbol::Op(BinaryOp::Logical(LogicalOp::Except))),
    ("EXCEPT", Symbol::Op(BinaryOp::Logical(LogicalOp::Except))),
];

impl Symbol {
    pub fn label(&self) -> &'static str {
        SYMBOL_TABLE
            .iter()
            .find(|(_, symbol)| symbol == self)
            .map(|(label, _)| *label)
            .unwrap_or("?")
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SYMBOL_TABLE
            .iter()
            .find(|(label, _)| *label == trimmed)
            .map(|(_, symbol)| *symbol)
            .ok_or_else(|| {
                ValidationError::invalid_format("element", format!("unknown symbol '{}'", s))
            })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a literal number is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    /// An absolute count (`{"type": "input"}`).
    Input,
    /// A percentage of total participants (`{"type": "percent"}`).
    Percent,
}

/// A numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(rename = "type")]
    pub kind: LiteralKind,
    pub value: f64,
}

/// One token of a condition expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementRepr", into = "ElementRepr")]
pub enum Element {
    Symbol(Symbol),
    Literal(Literal),
}

impl Element {
    pub fn counter(counter: Counter) -> Self {
        Element::Symbol(Symbol::Counter(counter))
    }

    pub fn op(op: BinaryOp) -> Self {
        Element::Symbol(Symbol::Op(op))
    }

    pub fn number(value: f64) -> Self {
        Element::Literal(Literal {
            kind: LiteralKind::Input,
            value,
        })
    }

    pub fn percent(value: f64) -> Self {
        Element::Literal(Literal {
            kind: LiteralKind::Percent,
            value,
        })
    }
}

/// Parses a bare symbol label, e.g. `Element::from_str("За")`.
impl FromStr for Element {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Element::Symbol(s.parse()?))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ElementRepr {
    Symbol(String),
    Literal(Literal),
}

impl TryFrom<ElementRepr> for Element {
    type Error = ValidationError;

    fn try_from(repr: ElementRepr) -> Result<Self, Self::Error> {
        match repr {
            ElementRepr::Symbol(label) => label.parse(),
            ElementRepr::Literal(literal) if literal.value.is_finite() => {
                Ok(Element::Literal(literal))
            }
            ElementRepr::Literal(_) => Err(ValidationError::invalid_format(
                "element",
                "literal value must be a finite number",
            )),
        }
    }
}

impl From<Element> for ElementRepr {
    fn from(element: Element) -> Self {
        match element {
            Element::Symbol(symbol) => ElementRepr::Symbol(symbol.label().to_string()),
            Element::Literal(literal) => ElementRepr::Literal(literal),
        }
    }
}

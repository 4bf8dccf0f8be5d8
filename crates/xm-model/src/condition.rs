//! Transition conditions and message filters.
//!
//! Conditions arrive from the document as raw token trees ([`ConditionDef`]):
//! operator tokens like `EQ` and `AND`, operand strings like `a.x`, `m.range`
//! or `1.5`, and unparsed time fields.  The validator lowers a def into the
//! typed [`Condition`] tree, binding operands against the agent's memory and
//! the message payload, and collecting every agent variable the predicate may
//! read into the root's `read_only_vars`.
//!
//! The two-layer split replaces the original's in-place string rewriting:
//! a def is immutable input, a [`Condition`] is guaranteed well-formed.

use std::collections::BTreeSet;
use std::fmt;

// ── Raw form ──────────────────────────────────────────────────────────────────

/// An unresolved condition tree, exactly as parsed.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionDef {
    /// Negation wrapper.
    Not(Box<ConditionDef>),
    /// Periodic time test.  All fields raw: `phase` may be an `a.`-prefixed
    /// agent variable or an integer literal, `duration` an integer literal.
    Time {
        period: String,
        phase: String,
        duration: Option<String>,
    },
    /// Comparison of two operand strings with a symbolic operator token
    /// (`EQ`, `NEQ`, `LEQ`, `GEQ`, `LT`, `GT`).
    Values { lhs: String, op: String, rhs: String },
    /// Two nested conditions joined by a symbolic logical token (`AND`, `OR`).
    Nested {
        lhs: Box<ConditionDef>,
        op: String,
        rhs: Box<ConditionDef>,
    },
}

// ── Resolved form ─────────────────────────────────────────────────────────────

/// A validated condition: a well-formed expression tree plus the set of agent
/// variables the whole predicate reads (cached at the root only).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub expr: ConditionExpr,
    /// Every agent variable read anywhere in `expr`.  Charged to the source
    /// state of the guarded transition during state-graph construction.
    pub read_only_vars: BTreeSet<String>,
}

/// The expression tree of a validated condition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionExpr {
    Time {
        /// Name of a declared time unit.
        period: String,
        phase: TimePhase,
        duration: Option<i32>,
    },
    Values {
        lhs: Operand,
        op: Comparison,
        rhs: Operand,
    },
    Compound {
        lhs: Box<ConditionExpr>,
        op: Logical,
        rhs: Box<ConditionExpr>,
    },
    Not(Box<ConditionExpr>),
}

/// The phase of a time condition: a fixed iteration offset or an agent
/// variable read at run time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimePhase {
    Value(i32),
    AgentVar(String),
}

/// One side of a value comparison.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Bound `a.`-prefixed operand (prefix stripped).
    AgentVar(String),
    /// Bound `m.`-prefixed operand (prefix stripped).
    MessageVar(String),
    /// Anything else must parse as a double.
    Literal(f64),
}

/// Comparison operator, stored resolved.  `from_symbol` reads the document
/// token; `as_c_op` renders the C-style spelling used in diagnostics and
/// generated code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Eq,
    Neq,
    Leq,
    Geq,
    Lt,
    Gt,
}

impl Comparison {
    pub fn from_symbol(token: &str) -> Option<Self> {
        match token {
            "EQ" => Some(Self::Eq),
            "NEQ" => Some(Self::Neq),
            "LEQ" => Some(Self::Leq),
            "GEQ" => Some(Self::Geq),
            "LT" => Some(Self::Lt),
            "GT" => Some(Self::Gt),
            _ => None,
        }
    }

    pub fn as_c_op(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Leq => "<=",
            Self::Geq => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }
}

/// Logical connective between two nested conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Logical {
    And,
    Or,
}

impl Logical {
    pub fn from_symbol(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_c_op(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────
//
// Conditions print in the C-style spelling the generated agent code uses,
// which is also what diagnostics quote back at the modeller.

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::AgentVar(name) => write!(f, "a.{name}"),
            Operand::MessageVar(name) => write!(f, "m.{name}"),
            Operand::Literal(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for TimePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePhase::Value(value) => write!(f, "{value}"),
            TimePhase::AgentVar(name) => write!(f, "a.{name}"),
        }
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionExpr::Values { lhs, op, rhs } => {
                write!(f, "{lhs} {} {rhs}", op.as_c_op())
            }
            ConditionExpr::Compound { lhs, op, rhs } => {
                write!(f, "({lhs}) {} ({rhs})", op.as_c_op())
            }
            ConditionExpr::Not(inner) => write!(f, "not({inner})"),
            ConditionExpr::Time { period, phase, duration } => match duration {
                Some(duration) => write!(f, "time({period}, {phase}, {duration})"),
                None => write!(f, "time({period}, {phase})"),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}

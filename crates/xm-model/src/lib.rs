//! `xm-model` — the declarative model an agent simulation is compiled from.
//!
//! A model names its agents (finite state machines over typed memory), the
//! messages they exchange, environment constants, abstract data types and
//! time units.  The structures here are **parser-facing**: an external
//! document reader fills them with raw strings (`_array` type suffixes,
//! `[N]` name suffixes, `EQ`/`AND` operator tokens, unparsed numbers) and
//! the validator in `xm-validate` processes, resolves and checks them.
//!
//! # Lifecycle
//!
//! | Phase     | Who mutates                | Marker                        |
//! |-----------|----------------------------|-------------------------------|
//! | parse     | document reader (external) | `Model::validated == false`   |
//! | validate  | `xm-validate`              | sets `Model::validated`       |
//! | compile   | nobody — read-only         | graph builders take `&Model`  |
//!
//! Graph builders refuse to run on a model whose `validated` flag is unset.

pub mod agent;
pub mod condition;
pub mod datatype;
pub mod function;
pub mod ioput;
pub mod message;
pub mod model;
pub mod time_unit;
pub mod variable;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, StartStateResolution};
pub use condition::{
    Comparison, Condition, ConditionDef, ConditionExpr, Logical, Operand, TimePhase,
};
pub use datatype::{DataType, FUNDAMENTAL_TYPES};
pub use function::Function;
pub use ioput::{IOput, Sort};
pub use message::Message;
pub use model::Model;
pub use time_unit::TimeUnit;
pub use variable::Variable;

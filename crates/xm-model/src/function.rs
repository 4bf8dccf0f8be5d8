//! `Function` — one transition of an agent's state machine.

use std::collections::BTreeSet;

use crate::condition::{Condition, ConditionDef};
use crate::ioput::IOput;

/// A transition function `current_state → next_state`.
///
/// The identity of a function is the tuple
/// `(agent, name, current_state, next_state)` — the same implementation name
/// may legally appear on several transitions.
///
/// Memory-access sets are raw declarations until validated: the validator
/// checks every name against the agent's memory, rejects duplicates across
/// the two sets, and — under the lenient policy — promotes all agent memory
/// to `read_write_vars` when `memory_access_info_available` is false.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    pub name: String,
    pub current_state: String,
    pub next_state: String,

    /// Raw guard condition, as parsed.
    pub condition_def: Option<ConditionDef>,
    /// Resolved guard condition, set by the validator.
    pub condition: Option<Condition>,

    pub inputs: Vec<IOput>,
    pub outputs: Vec<IOput>,

    /// Variables the function reads but never writes.
    pub read_only_vars: BTreeSet<String>,
    /// Variables the function may read and write.
    pub read_write_vars: BTreeSet<String>,

    /// `false` when the document declared no memory-access block at all.
    pub memory_access_info_available: bool,
}

impl Function {
    /// A transition with no condition, no communication and no declared
    /// memory access.
    pub fn new(
        name: impl Into<String>,
        current_state: impl Into<String>,
        next_state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_state: current_state.into(),
            next_state: next_state.into(),
            ..Self::default()
        }
    }

    pub fn with_condition(mut self, def: ConditionDef) -> Self {
        self.condition_def = Some(def);
        self
    }

    pub fn with_input(mut self, input: IOput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: IOput) -> Self {
        self.outputs.push(output);
        self
    }

    /// Declare memory access.  Marks the access info as available even when
    /// both sets are empty (an explicit empty block is a declaration).
    pub fn with_memory_access(mut self, read_only: &[&str], read_write: &[&str]) -> Self {
        self.read_only_vars = read_only.iter().map(|s| s.to_string()).collect();
        self.read_write_vars = read_write.iter().map(|s| s.to_string()).collect();
        self.memory_access_info_available = true;
        self
    }

    /// `true` if the transition carries a guard (raw or resolved).
    pub fn has_condition(&self) -> bool {
        self.condition.is_some() || self.condition_def.is_some()
    }
}

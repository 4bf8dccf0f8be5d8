//! `Agent` — a finite state machine with memory (an x-machine).

use std::collections::BTreeSet;

use crate::function::Function;
use crate::variable::{variable_exists, Variable};

/// Outcome of deriving an agent's start state from its transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartStateResolution {
    /// Exactly one current-state label never appears as a next state.
    One(String),
    /// Every state appears as some function's next state.
    None,
    /// More than one candidate — the state machine has no unique entry.
    Multiple(Vec<String>),
}

/// An agent type: named memory plus transition functions.
///
/// `start_state` and `end_states` are derived, not declared: the validator
/// calls [`resolve_start_state`](Agent::resolve_start_state) and
/// [`derive_end_states`](Agent::derive_end_states) and stores the results.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub name: String,
    pub variables: Vec<Variable>,
    pub functions: Vec<Function>,

    /// The unique entry state, set by the validator.
    pub start_state: Option<String>,
    /// States that no function leaves, set by the validator.
    pub end_states: BTreeSet<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    /// `true` if the agent's memory declares a variable called `name`.
    pub fn has_variable(&self, name: &str) -> bool {
        variable_exists(name, &self.variables)
    }

    /// Names of all memory variables in declaration order.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Candidate start states: current-state labels that never appear as any
    /// function's next state.
    pub fn resolve_start_state(&self) -> StartStateResolution {
        let mut candidates: BTreeSet<&str> =
            self.functions.iter().map(|f| f.current_state.as_str()).collect();
        for f in &self.functions {
            candidates.remove(f.next_state.as_str());
        }
        let mut candidates: Vec<String> =
            candidates.into_iter().map(str::to_owned).collect();
        match candidates.len() {
            0 => StartStateResolution::None,
            1 => StartStateResolution::One(candidates.pop().expect("len checked")),
            _ => StartStateResolution::Multiple(candidates),
        }
    }

    /// End states: next-state labels that never appear as any function's
    /// current state (no transition leaves them).
    pub fn derive_end_states(&self) -> BTreeSet<String> {
        let mut ends: BTreeSet<&str> =
            self.functions.iter().map(|f| f.next_state.as_str()).collect();
        for f in &self.functions {
            ends.remove(f.current_state.as_str());
        }
        ends.into_iter().map(str::to_owned).collect()
    }
}

//! `Model` — the root container handed from the document reader to the
//! validator and on to the graph builders.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use crate::agent::Agent;
use crate::datatype::{DataType, FUNDAMENTAL_TYPES};
use crate::message::Message;
use crate::time_unit::TimeUnit;
use crate::variable::Variable;

/// A complete declarative model.
///
/// Construct with [`Model::new`] and the `add_*` methods (the surface a
/// document reader drives), then hand to `xm-validate`.  The `validated`
/// flag is the gate the graph builders check before doing any work.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    pub name: String,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,

    /// Paths of models merged into this one by the document reader.
    /// Recorded for duplicate/extension checks; resolution already happened.
    pub included_models: Vec<PathBuf>,

    /// Environment constants, validated as variables without dynamic arrays.
    pub constants: Vec<Variable>,
    /// User-declared abstract data types.
    pub data_types: Vec<DataType>,
    pub time_units: Vec<TimeUnit>,
    /// Implementation files holding the transition function bodies.
    pub function_files: Vec<String>,

    pub agents: Vec<Agent>,
    pub messages: Vec<Message>,

    /// Registry of resolvable type names.  Seeded with the fundamentals;
    /// the validator adds each accepted ADT.
    allowed_types: FxHashSet<String>,

    validated: bool,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            author: None,
            description: None,
            included_models: Vec::new(),
            constants: Vec::new(),
            data_types: Vec::new(),
            time_units: Vec::new(),
            function_files: Vec::new(),
            agents: Vec::new(),
            messages: Vec::new(),
            allowed_types: FUNDAMENTAL_TYPES.iter().map(|s| s.to_string()).collect(),
            validated: false,
        }
    }

    // ── Document-reader surface ───────────────────────────────────────────

    pub fn add_agent(&mut self, agent: Agent) -> &mut Self {
        self.agents.push(agent);
        self
    }

    pub fn add_message(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    pub fn add_constant(&mut self, constant: Variable) -> &mut Self {
        self.constants.push(constant);
        self
    }

    pub fn add_data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_types.push(data_type);
        self
    }

    pub fn add_time_unit(&mut self, time_unit: TimeUnit) -> &mut Self {
        self.time_units.push(time_unit);
        self
    }

    pub fn add_function_file(&mut self, path: impl Into<String>) -> &mut Self {
        self.function_files.push(path.into());
        self
    }

    pub fn add_included_model(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.included_models.push(path.into());
        self
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn time_unit(&self, name: &str) -> Option<&TimeUnit> {
        self.time_units.iter().find(|t| t.name == name)
    }

    /// Effective period of a time unit in iterations, multiplied down its
    /// unit chain (`week` of 7 `day`s of 24 `iteration`s → 168).
    ///
    /// Returns `None` for an unknown unit or an unresolved chain; only call
    /// on validated models, where chains are known to ground out.
    pub fn period_in_iterations(&self, name: &str) -> Option<i64> {
        let mut period: i64 = 1;
        let mut current = name;
        // Chain length is bounded by the unit count on a validated model.
        for _ in 0..=self.time_units.len() {
            if current == xm_core::ITERATION_UNIT {
                return Some(period);
            }
            let unit = self.time_unit(current)?;
            period *= i64::from(unit.period);
            current = &unit.unit;
        }
        None
    }

    // ── Type registry ─────────────────────────────────────────────────────

    /// `true` if `type_name` resolves to a fundamental or an accepted ADT.
    pub fn is_allowed_type(&self, type_name: &str) -> bool {
        self.allowed_types.contains(type_name)
    }

    /// Register an accepted ADT name.  Called by the validator only.
    pub fn register_allowed_type(&mut self, type_name: impl Into<String>) {
        self.allowed_types.insert(type_name.into());
    }

    // ── Validation gate ───────────────────────────────────────────────────

    /// `true` once the validator has accepted this model.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Declare the model validated.  Called by the validator on success;
    /// graph builders refuse models where this has not happened.
    pub fn mark_validated(&mut self) {
        self.validated = true;
    }
}

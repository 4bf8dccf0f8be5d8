//! `Message` — a board-mediated message type.

use crate::variable::{variable_exists, Variable};

/// A message type: a name (unique across the model) plus payload variables.
/// Message payloads never hold dynamic arrays.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub name: String,
    pub variables: Vec<Variable>,
}

impl Message {
    pub fn new(name: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self { name: name.into(), variables }
    }

    /// `true` if the payload declares a variable called `name`.  Used to
    /// bind `m.`-prefixed condition operands and sort keys.
    pub fn has_variable(&self, name: &str) -> bool {
        variable_exists(name, &self.variables)
    }
}

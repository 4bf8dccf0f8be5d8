//! `DataType` — fundamental types and user-declared ADTs.

use crate::Variable;

/// Type names that are always registered and never user-declarable.
pub const FUNDAMENTAL_TYPES: [&str; 4] = ["int", "float", "double", "char"];

/// A data type: either one of the pre-registered fundamentals or a
/// user-declared abstract data type composed of [`Variable`] members.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataType {
    pub name: String,
    pub variables: Vec<Variable>,
    pub is_fundamental: bool,
    /// Set during validation: `true` iff any member holds a dynamic array.
    pub holds_dynamic_array: bool,
}

impl DataType {
    /// A user-declared ADT with the given members.
    pub fn adt(name: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self {
            name: name.into(),
            variables,
            is_fundamental: false,
            holds_dynamic_array: false,
        }
    }
}

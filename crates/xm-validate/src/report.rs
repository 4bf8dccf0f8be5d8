//! Validation diagnostics.

use std::fmt;

use thiserror::Error;
use xm_graph::GraphError;

/// One validation problem, carrying the owning entity so the message alone
/// locates the fault.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{kind} name is not valid: '{name}'")]
    InvalidName { kind: &'static str, name: String },

    #[error("duplicate {kind} name: '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("data type '{type_name}' not valid for variable '{variable}'")]
    InvalidType { variable: String, type_name: String },

    #[error("dynamic array not allowed: '{type_name} {variable}' ({position})")]
    DynamicArrayNotAllowed {
        variable: String,
        type_name: String,
        /// `"declared directly"` or `"held via data type"`.
        position: &'static str,
    },

    #[error("static array size is not valid for variable '{variable}': '{value}'")]
    InvalidArraySize { variable: String, value: String },

    #[error("variable '{variable}' constant value is not 'true' or 'false': '{value}'")]
    InvalidConstant { variable: String, value: String },

    #[error("time unit '{name}' is not valid: {reason}")]
    InvalidTimeUnit { name: String, reason: String },

    #[error("condition/filter in {context} is not valid: {reason}")]
    InvalidCondition { context: String, reason: String },

    #[error("input/output of message '{message}' is not valid: {reason}")]
    InvalidIOput { message: String, reason: String },

    #[error(
        "memory access of function '{function}' in agent '{agent}' is not \
         valid: {reason}"
    )]
    MemoryAccessViolation {
        agent: String,
        function: String,
        reason: String,
    },

    #[error("function file does not end in '.cpp': '{path}'")]
    InvalidFunctionFile { path: String },

    #[error("included model '{path}' is not valid: {reason}")]
    IncludedModelProblem { path: String, reason: String },

    /// State-graph or model-graph failure surfaced through validation.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A non-empty batch of validation errors, in declaration order.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `true` if any error matches `pred` — handy in tests.
    pub fn any(&self, pred: impl Fn(&ValidationError) -> bool) -> bool {
        self.errors.iter().any(pred)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "Error: {error}")?;
        }
        let n = self.errors.len();
        write!(f, "{n} error{} found.", if n == 1 { "" } else { "s" })
    }
}

impl std::error::Error for ValidationReport {}

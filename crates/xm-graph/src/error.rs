//! Graph-building errors.
//!
//! Unlike validation errors these are fatal at first occurrence: once a
//! graph is cyclic or structurally broken, every downstream analysis is
//! unsound, so builders stop immediately.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("agent '{agent}' doesn't have a start state")]
    NoStartState { agent: String },

    #[error("agent '{agent}' has multiple possible start states: {states:?}")]
    MultipleStartStates { agent: String, states: Vec<String> },

    #[error(
        "function '{function}' of agent '{agent}' leaves a state with more \
         than one outgoing function but has no condition"
    )]
    UnconditionalBranch { agent: String, function: String },

    #[error("cycle detected in state graph of agent '{agent}': {edge}")]
    CyclicStateGraph { agent: String, edge: String },

    #[error("cycle detected in model graph: {edge}")]
    CyclicModelGraph { edge: String },

    #[error("model '{model}' has not been validated")]
    UnvalidatedModel { model: String },
}

pub type GraphResult<T> = Result<T, GraphError>;

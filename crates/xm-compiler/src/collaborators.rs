//! Registration surfaces for the external memory and message-board
//! managers.
//!
//! The compiler references population storage only by `(agent, variable)`
//! strings; these traits are how those strings reach the managers before
//! the first iteration runs.

use tracing::warn;
use xm_model::Model;

/// Agent memory element types the column store supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElemType {
    Int,
    Double,
}

impl ElemType {
    /// Map a model type name onto a storable element type.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "double" => Some(Self::Double),
            _ => None,
        }
    }
}

/// The typed column store holding agent populations.
pub trait MemoryRegistrar {
    fn register_agent(&mut self, name: &str);
    fn register_agent_var(&mut self, agent: &str, var: &str, elem: ElemType);
    fn hint_population_size(&mut self, agent: &str, size: usize);
}

/// The message-board manager.
pub trait BoardRegistrar {
    fn register_message(&mut self, name: &str);
}

/// Register every agent and its storable memory variables.
///
/// Variables whose type has no storable element (ADTs, arrays of them) are
/// skipped with a warning — the store's type registry does not cover them.
pub fn register_memory<M: MemoryRegistrar>(
    model: &Model,
    population_size_hint: usize,
    memory: &mut M,
) {
    for agent in &model.agents {
        memory.register_agent(&agent.name);
        for variable in &agent.variables {
            match ElemType::from_type_name(&variable.type_name) {
                Some(elem) => memory.register_agent_var(&agent.name, &variable.name, elem),
                None => warn!(
                    agent = %agent.name,
                    variable = %variable.name,
                    type_name = %variable.type_name,
                    "no storable element type; variable not registered"
                ),
            }
        }
        memory.hint_population_size(&agent.name, population_size_hint);
    }
}

/// Register every message type with the board manager.
pub fn register_boards<B: BoardRegistrar>(model: &Model, boards: &mut B) {
    for message in &model.messages {
        boards.register_message(&message.name);
    }
}

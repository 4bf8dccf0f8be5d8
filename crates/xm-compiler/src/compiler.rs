//! The compile pipeline and its result.

use std::io;
use std::path::Path;

use tracing::info;
use xm_graph::dot::save_dot;
use xm_graph::{DependencyGraph, ModelGraph, StateGraph};
use xm_model::Model;
use xm_sched::{emit_task_list, register_task_list, SchedResult, TaskIdMap, TaskList, TaskRegistrar};
use xm_validate::{validate, ValidationOptions};

use crate::error::CompileResult;

/// Everything the pipeline produces for one model.
///
/// The intermediate graphs are retained: they cost little, and the GraphViz
/// writers below are the main debugging tool for surprising schedules.
#[derive(Debug)]
pub struct CompiledModel {
    pub model: Model,
    /// Per-agent state graphs, in `model.agents` order.
    pub state_graphs: Vec<StateGraph>,
    /// Per-agent reduced dependency graphs, in `model.agents` order.
    pub dependency_graphs: Vec<DependencyGraph>,
    pub model_graph: ModelGraph,
    pub task_list: TaskList,
    pub task_id_map: TaskIdMap,
}

/// Run the whole pipeline.
///
/// Validation problems come back as one batched report; graph-level
/// failures after validation (only the cross-agent cycle check can still
/// fire) are fatal at first occurrence.
///
/// # Example
///
/// ```
/// use xm_compiler::{compile, ValidationOptions};
/// use xm_model::{Agent, Function, Model, Variable};
///
/// let mut model = Model::new("demo");
/// model.add_agent(
///     Agent::new("Walker")
///         .with_variable(Variable::new("double", "x"))
///         .with_function(
///             Function::new("step", "start", "end").with_memory_access(&[], &["x"]),
///         ),
/// );
/// let compiled = compile(model, &ValidationOptions::default()).unwrap();
/// // Iteration framing, the function, and its population output.
/// assert_eq!(compiled.task_list.len(), 4);
/// ```
pub fn compile(model: Model, options: &ValidationOptions) -> CompileResult<CompiledModel> {
    let validated = validate(model, options)?;
    let model = validated.model;

    let dependency_graphs: Vec<DependencyGraph> = model
        .agents
        .iter()
        .zip(&validated.state_graphs)
        .map(|(agent, sg)| DependencyGraph::build(sg, &agent.variable_names()))
        .collect();

    let model_graph = ModelGraph::build(&model.name, &dependency_graphs)?;
    let (task_list, task_id_map) = emit_task_list(&model_graph);

    info!(
        model = %model.name,
        agents = model.agents.len(),
        tasks = task_list.len(),
        dependencies = task_id_map.len(),
        "model compiled"
    );

    Ok(CompiledModel {
        model,
        state_graphs: validated.state_graphs,
        dependency_graphs,
        model_graph,
        task_list,
        task_id_map,
    })
}

impl CompiledModel {
    /// Register every task and dependency with an executor, finishing with
    /// `finalise()`.
    pub fn register<R: TaskRegistrar>(&self, registrar: &mut R) -> SchedResult<()> {
        register_task_list(&self.task_list, &self.task_id_map, registrar)
    }

    // ── GraphViz output ───────────────────────────────────────────────────

    /// Write the state graph of `agent_name` as a `.dot` file.
    /// Returns `false` if the agent is unknown.
    pub fn write_state_graph_dot(&self, agent_name: &str, path: &Path) -> io::Result<bool> {
        match self.state_graphs.iter().find(|g| g.agent_name == agent_name) {
            Some(graph) => save_dot(&graph.graph, path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Write the reduced dependency graph of `agent_name` as a `.dot` file.
    /// Returns `false` if the agent is unknown.
    pub fn write_dependency_graph_dot(&self, agent_name: &str, path: &Path) -> io::Result<bool> {
        match self
            .dependency_graphs
            .iter()
            .find(|g| g.agent_name == agent_name)
        {
            Some(graph) => save_dot(&graph.graph, path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Write the assembled model graph as a `.dot` file.
    pub fn write_model_graph_dot(&self, path: &Path) -> io::Result<()> {
        save_dot(&self.model_graph.graph, path)
    }
}

//! Per-agent state graph construction and checks.
//!
//! The state graph is the literal picture of an agent's state machine:
//! state vertices and function vertices joined by `State` edges, message
//! vertices joined by `Communication` edges.  It exists to be checked
//! (unique start state, acyclicity, conditions on branches) and then
//! transformed into the dependency graph.

use std::collections::BTreeSet;

use tracing::debug;
use xm_core::VertexId;
use xm_model::{Agent, Function, StartStateResolution};

use crate::algo::find_back_edge;
use crate::dependency::DepKind;
use crate::digraph::TaskGraph;
use crate::error::{GraphError, GraphResult};
use crate::task::{Task, TaskKind};

/// The finished state graph of one agent.
///
/// `start_vertex` is the vertex of the derived start state; `end_vertices`
/// are the function vertices whose transition enters an end state.  Both are
/// inputs to dependency-graph construction.
#[derive(Clone, Debug)]
pub struct StateGraph {
    pub agent_name: String,
    pub graph: TaskGraph,
    pub start_vertex: VertexId,
    pub end_vertices: BTreeSet<VertexId>,
}

impl StateGraph {
    /// Build the state graph for `agent`.
    ///
    /// Derives the start state (exactly one current-state label that never
    /// appears as a next state) and the end states; fails fast on zero or
    /// multiple start candidates.  Cycle and branch-condition checks are
    /// separate so the validator can report them with the right error kinds.
    pub fn build(agent: &Agent) -> GraphResult<StateGraph> {
        let start_state = match agent.resolve_start_state() {
            StartStateResolution::One(name) => name,
            StartStateResolution::None => {
                return Err(GraphError::NoStartState { agent: agent.name.clone() });
            }
            StartStateResolution::Multiple(states) => {
                return Err(GraphError::MultipleStartStates {
                    agent: agent.name.clone(),
                    states,
                });
            }
        };
        let end_states = agent.derive_end_states();

        let mut builder = Builder {
            agent_name: agent.name.clone(),
            graph: TaskGraph::new(),
            start_vertex: VertexId::INVALID,
            end_vertices: BTreeSet::new(),
            start_state,
            end_states,
        };
        for function in &agent.functions {
            builder.add_function(function);
        }
        debug!(
            agent = %agent.name,
            vertices = builder.graph.vertex_count(),
            edges = builder.graph.edge_count(),
            "state graph built"
        );

        Ok(StateGraph {
            agent_name: builder.agent_name,
            graph: builder.graph,
            start_vertex: builder.start_vertex,
            end_vertices: builder.end_vertices,
        })
    }

    /// Report the first cycle, if any, naming the offending edge.
    pub fn check_cycles(&self) -> GraphResult<()> {
        match find_back_edge(&self.graph) {
            None => Ok(()),
            Some(edge) => {
                let source = self.graph.task(self.graph.source(edge));
                let target = self.graph.task(self.graph.target(edge));
                let dep = self.graph.dependency(edge);
                Err(GraphError::CyclicStateGraph {
                    agent: self.agent_name.clone(),
                    edge: format!("{} -> {} -> {}", source.name, dep.name, target.name),
                })
            }
        }
    }

    /// Every function leaving a state with out-degree > 1 must carry a
    /// condition.  Returns one error per violating function.
    pub fn check_branch_conditions(&self) -> Vec<GraphError> {
        let mut errors = Vec::new();
        for v in self.graph.vertices() {
            if self.graph.task(v).kind != TaskKind::State || self.graph.out_degree(v) <= 1 {
                continue;
            }
            for f in self.graph.successors(v) {
                let task = self.graph.task(f);
                if !task.has_condition {
                    errors.push(GraphError::UnconditionalBranch {
                        agent: self.agent_name.clone(),
                        function: task.name.clone(),
                    });
                }
            }
        }
        errors
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

struct Builder {
    agent_name: String,
    graph: TaskGraph,
    start_vertex: VertexId,
    end_vertices: BTreeSet<VertexId>,
    start_state: String,
    end_states: BTreeSet<String>,
}

impl Builder {
    /// Add one transition: its function vertex, its state vertices, its
    /// memory access sets and its message communication.
    fn add_function(&mut self, function: &Function) {
        let mut task = Task::new(&self.agent_name, &function.name, TaskKind::Function);
        task.has_condition = function.has_condition();
        for name in &function.read_only_vars {
            task.add_read_var(name);
        }
        for name in &function.read_write_vars {
            task.add_read_var(name);
            task.add_write_var(name);
        }
        let f = self.graph.add_task(task);

        self.wire_states(function, f);
        self.wire_messages(function, f);

        if self.end_states.contains(&function.next_state) {
            self.end_vertices.insert(f);
        }
    }

    /// `S_current → F → S_next`, both edges labelled with the state name.
    /// A guarded transition charges the guard's reads to the source state:
    /// the predicate is evaluated there, before the function runs.
    fn wire_states(&mut self, function: &Function, f: VertexId) {
        let current = self.state_vertex(&function.current_state);
        let next = self.state_vertex(&function.next_state);
        self.graph
            .add_edge(current, f, &function.current_state, DepKind::State);
        self.graph
            .add_edge(f, next, &function.next_state, DepKind::State);

        if let Some(condition) = &function.condition {
            for var in &condition.read_only_vars {
                self.graph.task_mut(current).add_read_var(var);
            }
        }
    }

    /// `M → F` for inputs, `F → M` for outputs, recording the message names
    /// on the function task.
    fn wire_messages(&mut self, function: &Function, f: VertexId) {
        for output in &function.outputs {
            let m = self.message_vertex(&output.message_name);
            self.graph
                .task_mut(f)
                .output_messages
                .insert(output.message_name.clone());
            self.graph
                .add_edge(f, m, &output.message_name, DepKind::Communication);
        }
        for input in &function.inputs {
            let m = self.message_vertex(&input.message_name);
            self.graph
                .task_mut(f)
                .input_messages
                .insert(input.message_name.clone());
            self.graph
                .add_edge(m, f, &input.message_name, DepKind::Communication);
        }
    }

    /// Find or create the state vertex called `name`, tracking the start
    /// vertex when the derived start state first appears.
    fn state_vertex(&mut self, name: &str) -> VertexId {
        if let Some(v) = self.graph.find_vertex(TaskKind::State, name) {
            return v;
        }
        let v = self
            .graph
            .add_task(Task::new(&self.agent_name, name, TaskKind::State));
        if name == self.start_state {
            self.start_vertex = v;
        }
        v
    }

    /// Find or create the message vertex called `name`.  Message tasks are
    /// parented by the message itself — they belong to no agent.
    fn message_vertex(&mut self, name: &str) -> VertexId {
        if let Some(v) = self.graph.find_vertex(TaskKind::Message, name) {
            return v;
        }
        self.graph.add_task(Task::new(name, name, TaskKind::Message))
    }
}

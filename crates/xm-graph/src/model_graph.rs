//! The model graph: every agent's dependency graph united into one
//! iteration-wide schedule.
//!
//! Assembly order matters:
//!
//! 1. `StartModel` / `FinishModel` framing vertices.
//! 2. Import every agent graph; each imported per-agent start vertex hangs
//!    off `StartModel`, each population-output vertex feeds `FinishModel`.
//! 3. Per-agent start vertices are contracted away — they only existed to
//!    anchor the per-agent sweep.
//! 4. Message vertices are replaced by a shared sync vertex per message
//!    name, and a clear vertex is added downstream of every reader.
//! 5. Cycle detection over the union: an inter-agent communication loop
//!    that was invisible per agent surfaces here and is fatal.

use rustc_hash::FxHashMap;
use tracing::debug;
use xm_core::VertexId;

use crate::algo::find_back_edge;
use crate::dep_graph::DependencyGraph;
use crate::dependency::{DepKind, Dependency};
use crate::digraph::TaskGraph;
use crate::error::{GraphError, GraphResult};
use crate::task::{Task, TaskKind};

/// The assembled, checked model graph.  Feed to the task emitter.
#[derive(Clone, Debug)]
pub struct ModelGraph {
    pub model_name: String,
    pub graph: TaskGraph,
    pub start: VertexId,
    pub finish: VertexId,
}

impl ModelGraph {
    /// Assemble the model graph from every agent's reduced dependency graph.
    pub fn build(model_name: &str, agents: &[DependencyGraph]) -> GraphResult<ModelGraph> {
        let mut graph = TaskGraph::new();
        let start = graph.add_task(Task::new(model_name, "Start", TaskKind::StartModel));
        let finish = graph.add_task(Task::new(model_name, "Finish", TaskKind::FinishModel));

        for agent in agents {
            import(&mut graph, start, finish, agent);
        }

        graph.contract_vertices(TaskKind::StartAgent, DepKind::Blank);
        rewire_messages_to_sync(&mut graph);
        add_message_clears(&mut graph);

        if let Some(edge) = find_back_edge(&graph) {
            let source = graph.task(graph.source(edge)).full_name();
            let target = graph.task(graph.target(edge)).full_name();
            let dep = &graph.dependency(edge).name;
            return Err(GraphError::CyclicModelGraph {
                edge: format!("{source} -> {dep} -> {target}"),
            });
        }

        debug!(
            model = model_name,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "model graph assembled"
        );
        Ok(ModelGraph {
            model_name: model_name.to_owned(),
            graph,
            start,
            finish,
        })
    }
}

// ── Assembly steps ────────────────────────────────────────────────────────────

/// Copy one agent graph into the union, hooking its framing vertices to the
/// model-level ones.
fn import(graph: &mut TaskGraph, start: VertexId, finish: VertexId, agent: &DependencyGraph) {
    let mut imported: FxHashMap<VertexId, VertexId> = FxHashMap::default();

    for v in agent.graph.vertices() {
        let nv = graph.add_task(agent.graph.task(v).clone());
        imported.insert(v, nv);
        match graph.task(nv).kind {
            TaskKind::StartAgent => {
                graph.add_edge(start, nv, "", DepKind::Blank);
            }
            TaskKind::IoPopWrite => {
                graph.add_edge(nv, finish, "", DepKind::Blank);
            }
            _ => {}
        }
    }

    for e in agent.graph.edge_ids() {
        let Dependency { name, kind } = agent.graph.dependency(e).clone();
        graph.add_edge(
            imported[&agent.graph.source(e)],
            imported[&agent.graph.target(e)],
            name,
            kind,
        );
    }
}

/// Replace every message vertex with a single sync vertex per message name.
/// Several agents may each carry a vertex for the same message; all of them
/// collapse onto the one sync.  Re-routed edges keep their communication
/// payloads.
fn rewire_messages_to_sync(graph: &mut TaskGraph) {
    for m in graph.vertices_of_kind(TaskKind::Message) {
        let name = graph.task(m).name.clone();
        let sync = match graph.find_vertex(TaskKind::MessageSync, &name) {
            Some(v) => v,
            None => graph.add_task(Task::new(&name, &name, TaskKind::MessageSync)),
        };

        let in_edges: Vec<_> = graph
            .in_edges(m)
            .iter()
            .map(|&e| (graph.source(e), graph.dependency(e).clone()))
            .collect();
        let out_edges: Vec<_> = graph
            .out_edges(m)
            .iter()
            .map(|&e| (graph.target(e), graph.dependency(e).clone()))
            .collect();

        for (producer, dep) in in_edges {
            graph.add_edge(producer, sync, dep.name, dep.kind);
        }
        for (consumer, dep) in out_edges {
            graph.add_edge(sync, consumer, dep.name, dep.kind);
        }
        graph.remove_vertex(m);
    }
}

/// Pair every sync vertex with a clear vertex that runs after all of the
/// message's readers.  A message nobody reads still gets its clear — the
/// board is wiped directly after synchronisation.
fn add_message_clears(graph: &mut TaskGraph) {
    for sync in graph.vertices_of_kind(TaskKind::MessageSync) {
        let name = graph.task(sync).name.clone();
        let consumers: Vec<VertexId> = graph.successors(sync).collect();

        let clear = graph.add_task(Task::new(&name, &name, TaskKind::MessageClear));
        if consumers.is_empty() {
            graph.add_edge(sync, clear, &name, DepKind::Communication);
        }
        for consumer in consumers {
            graph.add_edge(consumer, clear, &name, DepKind::Communication);
        }
    }
}

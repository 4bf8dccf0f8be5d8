//! Per-agent dependency graph: the state graph transformed into a
//! data-and-control DAG.
//!
//! The transformation pipeline, in order:
//!
//! 1. Branching states become condition vertices.
//! 2. Remaining state vertices are contracted away.
//! 3. Start/finish framing vertices are inserted; the start vertex seeds the
//!    last-writer map with every agent variable.
//! 4. A topological sweep merges last-writer / last-reader / last-condition
//!    sets through the graph and inserts `Condition` and `Variable` edges
//!    for every read-after-write and write-after-read hazard.
//! 5. Variables with identical live final-writer sets are grouped into
//!    population-output vertices; the finish vertex is consumed.
//! 6. State edges are deleted — ordering is now carried by data edges.
//! 7. Transitive reduction compacts the arena.
//!
//! Every step preserves acyclicity, so the result is a DAG whose topological
//! order is a correct execution schedule: two tasks are unordered only when
//! neither writes a variable the other touches.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use tracing::debug;
use xm_core::VertexId;

use crate::algo::{topo_sort, transitive_reduction};
use crate::dependency::DepKind;
use crate::digraph::TaskGraph;
use crate::state_graph::StateGraph;
use crate::task::{Task, TaskKind, CONDITION_PRIORITY};

/// The reduced dependency DAG of one agent.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    pub agent_name: String,
    pub graph: TaskGraph,
}

impl DependencyGraph {
    /// Transform `state_graph` into the reduced dependency graph.
    ///
    /// `variables` is the agent's full memory (the start vertex becomes the
    /// first writer of each).  The state graph must already have passed
    /// cycle and branch-condition checks.
    pub fn build(state_graph: &StateGraph, variables: &[String]) -> DependencyGraph {
        let mut b = Builder {
            agent_name: state_graph.agent_name.clone(),
            graph: state_graph.graph.clone(),
            start: state_graph.start_vertex,
            ends: state_graph.end_vertices.clone(),
        };

        b.promote_branching_states();
        b.contract_states();
        let finish = b.frame_start_finish(variables);
        b.sweep();
        b.emit_io_tasks(finish);
        b.remove_state_edges();
        // Per-variable vertices are never materialised, so there is nothing
        // to contract before reduction.
        let (graph, _) = transitive_reduction(&b.graph);

        debug!(
            agent = %b.agent_name,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        DependencyGraph { agent_name: b.agent_name, graph }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

struct Builder {
    agent_name: String,
    graph: TaskGraph,
    start: VertexId,
    ends: BTreeSet<VertexId>,
}

impl Builder {
    /// Retype every state with more than one outgoing transition into a
    /// condition vertex: the runtime evaluates the branch predicates once
    /// per iteration at this point.  Promoted vertices get a generated
    /// per-agent name and the executor's condition priority.
    fn promote_branching_states(&mut self) {
        let mut counter = 0usize;
        for v in self.graph.vertices_of_kind(TaskKind::State) {
            if self.graph.out_degree(v) <= 1 {
                continue;
            }
            let task = self.graph.task_mut(v);
            task.kind = TaskKind::Condition;
            task.name = counter.to_string();
            task.priority_level = CONDITION_PRIORITY;
            counter += 1;
        }
    }

    /// Contract the remaining (non-branching) state vertices, bridging
    /// predecessors to successors with unnamed state edges.  If the start
    /// vertex was a plain state it dissolves here and its unique successor
    /// function takes over as the start task.
    fn contract_states(&mut self) {
        if self.graph.task(self.start).kind == TaskKind::State {
            if let Some(f) = self.graph.successors(self.start).next() {
                self.start = f;
            }
        }
        self.graph.contract_vertices(TaskKind::State, DepKind::State);
    }

    /// Insert the start/finish framing.  The start vertex writes every agent
    /// variable and seeds its own last-writer map, so the first real reader
    /// of any variable picks up an edge from it.  Returns the finish vertex.
    fn frame_start_finish(&mut self, variables: &[String]) -> VertexId {
        let mut init = Task::new(&self.agent_name, &self.agent_name, TaskKind::StartAgent);
        for var in variables {
            init.add_write_var(var);
        }
        let init_v = self.graph.add_task(init);
        for var in variables {
            self.graph
                .task_mut(init_v)
                .last_writes
                .insert(var.clone(), BTreeSet::from([init_v]));
        }
        self.graph.add_edge(init_v, self.start, "Start", DepKind::Init);
        self.start = init_v;

        let finish_v = self.graph.add_task(Task::new(
            &self.agent_name,
            &self.agent_name,
            TaskKind::FinishAgent,
        ));
        for &end in &self.ends {
            self.graph.add_edge(end, finish_v, "End", DepKind::Init);
        }
        finish_v
    }

    /// The topological sweep: propagate last-writer, last-reader and
    /// last-condition sets forward and materialise hazard edges.
    fn sweep(&mut self) {
        let order = topo_sort(&self.graph)
            .expect("state graph was checked acyclic and transformations preserve it");
        for v in order {
            match self.graph.task(v).kind {
                TaskKind::Function
                | TaskKind::Condition
                | TaskKind::StartAgent
                | TaskKind::FinishAgent => self.sweep_vertex(v),
                _ => {}
            }
        }
    }

    fn sweep_vertex(&mut self, v: VertexId) {
        // Merge in-sets.  The start vertex has no predecessors and keeps its
        // seeded writes; everything else accumulates the union of its
        // predecessors' sets (message vertices contribute nothing).
        let task = self.graph.task(v);
        let mut writes = task.last_writes.clone();
        let mut reads = task.last_reads.clone();
        let mut conds = task.last_conditions.clone();
        let read_vars = task.read_vars.clone();
        let write_vars = task.write_vars.clone();
        let is_condition = task.kind == TaskKind::Condition;

        let preds: Vec<VertexId> = self.graph.predecessors(v).collect();
        for p in preds {
            let pt = self.graph.task(p);
            for (var, writers) in &pt.last_writes {
                writes.entry(var.clone()).or_default().extend(writers.iter().copied());
            }
            for (var, readers) in &pt.last_reads {
                reads.entry(var.clone()).or_default().extend(readers.iter().copied());
            }
            conds.extend(pt.last_conditions.iter().copied());
        }

        // Condition edges: this point is guarded by every dominating
        // condition vertex.  A condition vertex then supersedes them for its
        // whole downstream, until the next condition.
        for &c in &conds {
            self.graph.add_edge(c, v, "Condition", DepKind::Condition);
        }
        if is_condition {
            conds.clear();
            conds.insert(v);
        }

        // Hazard edges, one per (source, this) pair at most: read-after-write
        // from every live writer of a read variable, write-after-read from
        // every reader a write overtakes.
        let mut used: FxHashSet<VertexId> = FxHashSet::default();
        for var in &read_vars {
            if let Some(writers) = writes.get(var) {
                for &w in writers {
                    if used.insert(w) {
                        self.graph.add_edge(w, v, "Data", DepKind::Variable);
                    }
                }
            }
        }
        for var in &write_vars {
            if let Some(readers) = reads.get(var) {
                for &r in readers {
                    if r != v && used.insert(r) {
                        self.graph.add_edge(r, v, "Data", DepKind::Variable);
                    }
                }
            }
        }

        // Publish: a write supersedes all previous writers and readers of
        // the variable; every read is recorded for the next writer.
        for var in &write_vars {
            reads.remove(var);
            writes.insert(var.clone(), BTreeSet::from([v]));
        }
        for var in &read_vars {
            reads.entry(var.clone()).or_default().insert(v);
        }

        let task = self.graph.task_mut(v);
        task.last_writes = writes;
        task.last_reads = reads;
        task.last_conditions = conds;
    }

    /// Group variables by identical live final-writer sets (collected on the
    /// finish vertex during the sweep) and create one population-output
    /// vertex per group, fed by every writer in the set.  The finish vertex
    /// has served its purpose and is removed.
    fn emit_io_tasks(&mut self, finish: VertexId) {
        let mut live_writes = self.graph.task(finish).last_writes.clone();
        let mut counter = 0usize;

        while let Some((var, writers)) = live_writes.pop_first() {
            let mut group = vec![var];
            live_writes.retain(|other_var, other_writers| {
                if *other_writers == writers {
                    group.push(other_var.clone());
                    false
                } else {
                    true
                }
            });

            let mut io = Task::new(&self.agent_name, counter.to_string(), TaskKind::IoPopWrite);
            io.write_vars = group.into_iter().collect();
            let io_v = self.graph.add_task(io);
            for &w in &writers {
                self.graph.add_edge(w, io_v, "", DepKind::Data);
            }
            counter += 1;
        }

        self.graph.remove_vertex(finish);
    }

    /// Delete every state edge; ordering is now fully expressed by data,
    /// condition and communication edges.
    fn remove_state_edges(&mut self) {
        let state_edges: Vec<_> = self
            .graph
            .edge_ids()
            .filter(|&e| self.graph.dependency(e).kind == DepKind::State)
            .collect();
        for e in state_edges {
            self.graph.remove_edge(e);
        }
    }
}

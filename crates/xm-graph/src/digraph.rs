//! `TaskGraph` — an arena-backed directed multigraph of tasks.
//!
//! # Data layout
//!
//! Vertices and edges live in parallel vectors indexed by the dense handles
//! `VertexId` and `EdgeId`.  Removal marks a slot dead and unlinks it from
//! the adjacency lists; the payload stays in place so handles held elsewhere
//! never alias a different element.  Dead slots are only reclaimed when the
//! graph is compacted into a fresh arena (transitive reduction does this).
//!
//! Adjacency lists hold edge ids in insertion order, and vertex iteration is
//! in id order, so every traversal over a given graph value is
//! deterministic.

use xm_core::{EdgeId, VertexId};

use crate::dependency::{DepKind, Dependency};
use crate::task::{Task, TaskKind};

/// One directed edge: endpoints plus its [`Dependency`] payload.
#[derive(Clone, Debug)]
pub(crate) struct EdgeRec {
    pub source: VertexId,
    pub target: VertexId,
    pub dep: Dependency,
}

/// An arena-backed directed multigraph with [`Task`] vertex payloads and
/// [`Dependency`] edge payloads.
///
/// # Example
///
/// ```
/// use xm_graph::{DepKind, Task, TaskGraph, TaskKind};
///
/// let mut g = TaskGraph::new();
/// let a = g.add_task(Task::new("A", "f0", TaskKind::Function));
/// let b = g.add_task(Task::new("A", "f1", TaskKind::Function));
/// g.add_edge(a, b, "Data", DepKind::Variable);
/// assert_eq!(g.successors(a).collect::<Vec<_>>(), vec![b]);
/// assert_eq!(g.in_degree(b), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TaskGraph {
    pub(crate) tasks: Vec<Task>,
    vertex_live: Vec<bool>,
    pub(crate) edges: Vec<EdgeRec>,
    edge_live: Vec<bool>,
    out_adj: Vec<Vec<EdgeId>>,
    in_adj: Vec<Vec<EdgeId>>,
    live_vertices: usize,
    live_edges: usize,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Add a vertex carrying `task` and return its handle.
    pub fn add_task(&mut self, task: Task) -> VertexId {
        let id = VertexId(self.tasks.len() as u32);
        self.tasks.push(task);
        self.vertex_live.push(true);
        self.out_adj.push(Vec::new());
        self.in_adj.push(Vec::new());
        self.live_vertices += 1;
        id
    }

    /// Add a directed edge `source → target` labelled `(name, kind)`.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        name: impl Into<String>,
        kind: DepKind,
    ) -> EdgeId {
        debug_assert!(self.is_live(source) && self.is_live(target));
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(EdgeRec {
            source,
            target,
            dep: Dependency::new(name, kind),
        });
        self.edge_live.push(true);
        self.out_adj[source.index()].push(id);
        self.in_adj[target.index()].push(id);
        self.live_edges += 1;
        id
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Remove an edge.  Its handle becomes dead; the payload is retained but
    /// unreachable through traversal.
    pub fn remove_edge(&mut self, edge: EdgeId) {
        if !self.edge_live[edge.index()] {
            return;
        }
        self.edge_live[edge.index()] = false;
        let rec = &self.edges[edge.index()];
        self.out_adj[rec.source.index()].retain(|&e| e != edge);
        self.in_adj[rec.target.index()].retain(|&e| e != edge);
        self.live_edges -= 1;
    }

    /// Remove a vertex together with all incident edges.
    pub fn remove_vertex(&mut self, vertex: VertexId) {
        if !self.vertex_live[vertex.index()] {
            return;
        }
        let mut incident: Vec<EdgeId> = self.in_adj[vertex.index()].clone();
        incident.extend_from_slice(&self.out_adj[vertex.index()]);
        for e in incident {
            self.remove_edge(e);
        }
        self.vertex_live[vertex.index()] = false;
        self.live_vertices -= 1;
    }

    // ── Vertex access ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_live(&self, vertex: VertexId) -> bool {
        self.vertex_live[vertex.index()]
    }

    /// The task at `vertex`.  The handle must come from this graph value.
    #[inline]
    pub fn task(&self, vertex: VertexId) -> &Task {
        &self.tasks[vertex.index()]
    }

    #[inline]
    pub fn task_mut(&mut self, vertex: VertexId) -> &mut Task {
        &mut self.tasks[vertex.index()]
    }

    /// Iterator over all live vertex handles in id order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_live
            .iter()
            .enumerate()
            .filter(|&(_, &live)| live)
            .map(|(i, _)| VertexId(i as u32))
    }

    pub fn vertex_count(&self) -> usize {
        self.live_vertices
    }

    /// First live vertex whose task matches `(kind, name)`, if any.
    pub fn find_vertex(&self, kind: TaskKind, name: &str) -> Option<VertexId> {
        self.vertices()
            .find(|&v| self.task(v).kind == kind && self.task(v).name == name)
    }

    /// Live vertices of the given kind, in id order.
    pub fn vertices_of_kind(&self, kind: TaskKind) -> Vec<VertexId> {
        self.vertices().filter(|&v| self.task(v).kind == kind).collect()
    }

    // ── Edge access ───────────────────────────────────────────────────────

    #[inline]
    pub fn source(&self, edge: EdgeId) -> VertexId {
        self.edges[edge.index()].source
    }

    #[inline]
    pub fn target(&self, edge: EdgeId) -> VertexId {
        self.edges[edge.index()].target
    }

    #[inline]
    pub fn dependency(&self, edge: EdgeId) -> &Dependency {
        &self.edges[edge.index()].dep
    }

    /// Iterator over all live edge handles in id order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_live
            .iter()
            .enumerate()
            .filter(|&(_, &live)| live)
            .map(|(i, _)| EdgeId(i as u32))
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Outgoing edge handles of `vertex`, in insertion order.
    #[inline]
    pub fn out_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.out_adj[vertex.index()]
    }

    /// Incoming edge handles of `vertex`, in insertion order.
    #[inline]
    pub fn in_edges(&self, vertex: VertexId) -> &[EdgeId] {
        &self.in_adj[vertex.index()]
    }

    #[inline]
    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_adj[vertex.index()].len()
    }

    #[inline]
    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_adj[vertex.index()].len()
    }

    pub fn successors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_adj[vertex.index()].iter().map(|&e| self.target(e))
    }

    pub fn predecessors(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.in_adj[vertex.index()].iter().map(|&e| self.source(e))
    }

    /// `true` if at least one live edge `source → target` exists.
    pub fn has_edge(&self, source: VertexId, target: VertexId) -> bool {
        self.out_adj[source.index()]
            .iter()
            .any(|&e| self.target(e) == target)
    }

    /// The dependency of the first live edge `source → target`, if any.
    pub fn edge_between(&self, source: VertexId, target: VertexId) -> Option<&Dependency> {
        self.out_adj[source.index()]
            .iter()
            .find(|&&e| self.target(e) == target)
            .map(|&e| self.dependency(e))
    }

    // ── Contraction ───────────────────────────────────────────────────────

    /// Remove every vertex of `kind`, bridging each predecessor to each
    /// successor with an unnamed edge of `bridge_kind`.
    ///
    /// Used for state vertices (dependency-graph step) and per-agent start
    /// vertices (model assembly).
    pub fn contract_vertices(&mut self, kind: TaskKind, bridge_kind: DepKind) {
        for v in self.vertices_of_kind(kind) {
            let preds: Vec<VertexId> = self.predecessors(v).collect();
            let succs: Vec<VertexId> = self.successors(v).collect();
            for &p in &preds {
                for &s in &succs {
                    self.add_edge(p, s, "", bridge_kind);
                }
            }
            self.remove_vertex(v);
        }
    }
}

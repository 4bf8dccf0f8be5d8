//! Graph algorithms: topological sort, cycle detection, transitive
//! reduction.
//!
//! All three are deterministic: ties break on the smallest vertex id, so the
//! same graph always yields the same order, the same reported back edge and
//! the same reduced arena.

use std::collections::BinaryHeap;
use std::cmp::Reverse;

use rustc_hash::FxHashSet;
use xm_core::{EdgeId, VertexId};

use crate::digraph::TaskGraph;

/// Kahn's algorithm.  Returns live vertices in dependency order (producers
/// before consumers), or `None` if the graph has a cycle.
pub fn topo_sort(graph: &TaskGraph) -> Option<Vec<VertexId>> {
    let mut in_deg: Vec<usize> = Vec::new();
    let mut ready: BinaryHeap<Reverse<VertexId>> = BinaryHeap::new();

    let vertices: Vec<VertexId> = graph.vertices().collect();
    let max_index = vertices.last().map_or(0, |v| v.index() + 1);
    in_deg.resize(max_index, 0);

    for &v in &vertices {
        in_deg[v.index()] = graph.in_degree(v);
        if in_deg[v.index()] == 0 {
            ready.push(Reverse(v));
        }
    }

    let mut order = Vec::with_capacity(vertices.len());
    while let Some(Reverse(v)) = ready.pop() {
        order.push(v);
        for s in graph.successors(v) {
            in_deg[s.index()] -= 1;
            if in_deg[s.index()] == 0 {
                ready.push(Reverse(s));
            }
        }
    }

    (order.len() == vertices.len()).then_some(order)
}

/// Depth-first search for a back edge.  Returns the first edge found that
/// closes a cycle, or `None` for a DAG.
pub fn find_back_edge(graph: &TaskGraph) -> Option<EdgeId> {
    #[derive(Copy, Clone, PartialEq)]
    enum Colour {
        White,
        Grey,
        Black,
    }

    let max_index = graph
        .vertices()
        .last()
        .map_or(0, |v| v.index() + 1);
    let mut colour = vec![Colour::White; max_index];

    // Explicit stack of (vertex, next-out-edge-offset) frames.
    let mut stack: Vec<(VertexId, usize)> = Vec::new();

    for root in graph.vertices() {
        if colour[root.index()] != Colour::White {
            continue;
        }
        colour[root.index()] = Colour::Grey;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let out = graph.out_edges(v);
            if top.1 < out.len() {
                let edge = out[top.1];
                top.1 += 1;
                let t = graph.target(edge);
                match colour[t.index()] {
                    Colour::Grey => return Some(edge),
                    Colour::White => {
                        colour[t.index()] = Colour::Grey;
                        stack.push((t, 0));
                    }
                    Colour::Black => {}
                }
            } else {
                colour[v.index()] = Colour::Black;
                stack.pop();
            }
        }
    }

    None
}

/// Transitive reduction of a DAG.
///
/// Returns a fresh compacted arena (dead slots dropped, vertex ids re-keyed
/// densely in old-id order) plus the old→new vertex mapping.  An edge
/// `u → v` is dropped when some other successor of `u` already reaches `v`;
/// parallel edges between the same pair keep only the earliest.  Edge
/// payloads are carried over, so the edge-to-dependency association is
/// rebuilt rather than lost.  Sweep bookkeeping on tasks is cleared because
/// it holds vertex ids of the old arena.
///
/// The input must be acyclic — run cycle detection first.
pub fn transitive_reduction(graph: &TaskGraph) -> (TaskGraph, Vec<Option<VertexId>>) {
    let order = topo_sort(graph).expect("transitive reduction requires a DAG");

    // Reachability sets, computed sinks-first: reach[v] = {v} ∪ reach[succ].
    let max_index = order.iter().map(|v| v.index() + 1).max().unwrap_or(0);
    let mut reach: Vec<FxHashSet<VertexId>> = vec![FxHashSet::default(); max_index];
    for &v in order.iter().rev() {
        let mut set = FxHashSet::default();
        set.insert(v);
        for s in graph.successors(v) {
            set.insert(s);
            set.extend(reach[s.index()].iter().copied());
        }
        reach[v.index()] = set;
    }

    // Re-key live vertices densely, clearing stale sweep state.
    let mut reduced = TaskGraph::new();
    let mut old_to_new: Vec<Option<VertexId>> = vec![None; graph.tasks.len()];
    for v in graph.vertices() {
        let mut task = graph.task(v).clone();
        task.clear_sweep_state();
        old_to_new[v.index()] = Some(reduced.add_task(task));
    }

    // Keep an edge only if no sibling successor already reaches its target.
    let mut kept_pairs: FxHashSet<(VertexId, VertexId)> = FxHashSet::default();
    for e in graph.edge_ids() {
        let (u, v) = (graph.source(e), graph.target(e));
        let redundant = graph
            .successors(u)
            .any(|w| w != v && reach[w.index()].contains(&v));
        if redundant || !kept_pairs.insert((u, v)) {
            continue;
        }
        let dep = graph.dependency(e).clone();
        let (nu, nv) = (
            old_to_new[u.index()].expect("live source"),
            old_to_new[v.index()].expect("live target"),
        );
        reduced.add_edge(nu, nv, dep.name, dep.kind);
    }

    (reduced, old_to_new)
}

//! Task-list emission.
//!
//! Emission is deterministic: tasks are layered (each task one level above
//! its deepest parent), ordered by `(level, priority desc, vertex id)`, and
//! numbered densely from zero.  Re-running the emitter on the same model
//! graph yields identical `TaskId`s.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashSet;
use tracing::debug;
use xm_core::{TaskId, VertexId};
use xm_graph::algo::topo_sort;
use xm_graph::{ModelGraph, Task, TaskKind};

use crate::queue::queue_for;

/// The ordered task sequence handed to the executor.  Position equals
/// `TaskId`.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Human-readable `Level / Priority / Queue / Name` table, for logs.
    pub fn table(&self) -> TaskTable<'_> {
        TaskTable(self)
    }
}

/// Display wrapper rendering a [`TaskList`] as a diagnostic table.
pub struct TaskTable<'a>(&'a TaskList);

impl fmt::Display for TaskTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Level\tPriority\tQueue\tName")?;
        writeln!(f, "-----\t--------\t-----\t----")?;
        for task in self.0.iter() {
            let queue = match queue_for(task.kind) {
                Some(q) => format!("{q:?}"),
                None => String::from("-"),
            };
            writeln!(
                f,
                "{}\t{}\t\t{}\t{}",
                task.level,
                task.priority_level,
                queue,
                task.full_name()
            )?;
        }
        Ok(())
    }
}

/// Every direct dependency edge of the model graph as `(child, parent)`
/// pairs, deduplicated and sorted.
#[derive(Debug, Default)]
pub struct TaskIdMap {
    pairs: Vec<(TaskId, TaskId)>,
}

impl TaskIdMap {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, TaskId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Parents of `child`, in ascending id order.
    pub fn parents_of(&self, child: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.pairs
            .iter()
            .filter(move |(c, _)| *c == child)
            .map(|(_, p)| *p)
    }
}

/// Emit the ordered task list and the child→parent dependency relation.
///
/// Emitted tasks are normalised for the executor: `read_vars` keeps only
/// pure reads (write variables are expressed solely as writes), and each
/// task carries its diagnostic `level`.
pub fn emit_task_list(model_graph: &ModelGraph) -> (TaskList, TaskIdMap) {
    let graph = &model_graph.graph;
    let order = topo_sort(graph).expect("model graph is checked acyclic before emission");

    // Layering: one level above the deepest parent, sources at level 1.
    let max_index = order.iter().map(|v| v.index() + 1).max().unwrap_or(0);
    let mut level = vec![0u32; max_index];
    for &v in &order {
        let deepest = graph
            .predecessors(v)
            .map(|p| level[p.index()])
            .max()
            .unwrap_or(0);
        level[v.index()] = deepest + 1;
    }

    // Emission order: by layer, higher priority first within a layer,
    // vertex id as the final deterministic tie-break.
    let mut emission: Vec<VertexId> = order;
    emission.sort_by_key(|&v| {
        (
            level[v.index()],
            std::cmp::Reverse(graph.task(v).priority_level),
            v,
        )
    });

    let mut tasks = Vec::with_capacity(emission.len());
    let mut vertex_to_id = vec![TaskId::INVALID; max_index];
    for (i, &v) in emission.iter().enumerate() {
        let mut task = graph.task(v).clone();
        task.id = TaskId(i as u64);
        task.level = level[v.index()];
        let pure_reads: BTreeSet<String> = task
            .read_vars
            .difference(&task.write_vars)
            .cloned()
            .collect();
        task.read_vars = pure_reads;
        vertex_to_id[v.index()] = task.id;
        tasks.push(task);
    }

    let mut pairs: Vec<(TaskId, TaskId)> = Vec::with_capacity(graph.edge_count());
    let mut seen: FxHashSet<(TaskId, TaskId)> = FxHashSet::default();
    for e in graph.edge_ids() {
        let child = vertex_to_id[graph.target(e).index()];
        let parent = vertex_to_id[graph.source(e).index()];
        if seen.insert((child, parent)) {
            pairs.push((child, parent));
        }
    }
    pairs.sort_unstable();

    debug!(
        tasks = tasks.len(),
        dependencies = pairs.len(),
        model = %model_graph.model_name,
        "task list emitted"
    );
    debug_assert!(tasks
        .iter()
        .all(|t| t.kind != TaskKind::State && t.kind != TaskKind::Variable));

    (TaskList { tasks }, TaskIdMap { pairs })
}

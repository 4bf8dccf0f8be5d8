//! `Task` — the payload attached to every task-graph vertex.
//!
//! A single value type with a [`TaskKind`] tag replaces a per-kind class
//! hierarchy: the scheduler and the graph passes only ever need the uniform
//! shape, and unused fields stay empty.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use xm_core::{TaskId, VertexId};

/// What a task does, and which executor queue it lands in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    /// An agent transition function.
    Function,
    /// A promoted branching state: evaluate the guard predicates once per
    /// iteration at this point.
    Condition,
    /// A state-machine state.  Exists only during state-graph construction.
    State,
    /// A materialised per-variable vertex.  Not produced by this builder;
    /// kept so graphs that do materialise them can be rendered and checked.
    Variable,
    /// A message board.  Replaced by a sync/clear pair during assembly.
    Message,
    /// Board synchronisation — completes all posts of one message type.
    MessageSync,
    /// Board clear — runs after every reader of one message type.
    MessageClear,
    /// Emit a population snapshot of a group of agent variables.
    IoPopWrite,
    /// Per-agent init framing vertex (first writer of every variable).
    StartAgent,
    /// Per-agent finish framing vertex (collects live final writers).
    FinishAgent,
    /// Iteration entry, in-degree 0.
    StartModel,
    /// Iteration exit, out-degree 0.
    FinishModel,
}

/// Priority handed to promoted condition vertices.  Opaque executor hint
/// carried over from the reference scheduler.
pub const CONDITION_PRIORITY: u32 = 5;

/// One unit of schedulable work plus the bookkeeping the dependency sweep
/// threads through it.
///
/// `last_writes`, `last_reads` and `last_conditions` are working state for
/// the topological sweep; they hold vertex ids of the builder's graph and are
/// cleared when the graph is compacted by transitive reduction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    /// Dense list position, assigned by the task emitter.  `INVALID` until
    /// emission.
    pub id: TaskId,

    /// Owning agent name; message name for board tasks; model name for
    /// model-level framing tasks.
    pub parent_name: String,
    /// Function/state/message/variable-group name.
    pub name: String,
    pub kind: TaskKind,

    /// Diagnostic scheduling layer, assigned by the emitter (`>= 1`).
    pub level: u32,
    /// Tie-break priority within a level (higher runs first).
    pub priority_level: u32,

    /// Variables this task reads (read-only and read-write).
    pub read_vars: BTreeSet<String>,
    /// Variables this task writes (read-write only).
    pub write_vars: BTreeSet<String>,
    pub input_messages: BTreeSet<String>,
    pub output_messages: BTreeSet<String>,

    /// The transition carries a guard condition.
    pub has_condition: bool,

    /// Per-variable set of vertices whose writes are still live here.
    pub last_writes: BTreeMap<String, BTreeSet<VertexId>>,
    /// Per-variable set of vertices that read since the last write.
    pub last_reads: BTreeMap<String, BTreeSet<VertexId>>,
    /// Condition vertices dominating this point.
    pub last_conditions: BTreeSet<VertexId>,
}

impl Task {
    pub fn new(parent_name: impl Into<String>, name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: TaskId::INVALID,
            parent_name: parent_name.into(),
            name: name.into(),
            kind,
            level: 0,
            priority_level: 0,
            read_vars: BTreeSet::new(),
            write_vars: BTreeSet::new(),
            input_messages: BTreeSet::new(),
            output_messages: BTreeSet::new(),
            has_condition: false,
            last_writes: BTreeMap::new(),
            last_reads: BTreeMap::new(),
            last_conditions: BTreeSet::new(),
        }
    }

    /// `parent.name` — globally unique across a model graph.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.parent_name, self.name)
    }

    /// Record a read.  Read-write variables call both this and
    /// [`add_write_var`](Self::add_write_var).
    pub fn add_read_var(&mut self, name: impl Into<String>) {
        self.read_vars.insert(name.into());
    }

    pub fn add_write_var(&mut self, name: impl Into<String>) {
        self.write_vars.insert(name.into());
    }

    /// Drop the sweep bookkeeping.  Done when a graph is compacted, since
    /// the stored vertex ids would dangle in the new arena.
    pub fn clear_sweep_state(&mut self) {
        self.last_writes.clear();
        self.last_reads.clear();
        self.last_conditions.clear();
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} [{:?}]", self.parent_name, self.name, self.kind)
    }
}

//! `xm-graph` — graph construction and analysis for the rust_xm compiler.
//!
//! Three graphs are built from a validated model, in order:
//!
//! 1. **State graph** (per agent, [`state_graph`]): states and transition
//!    functions wired with `State` edges, plus message vertices.  Start-state
//!    derivation, cycle detection and branch-condition checks run here.
//! 2. **Dependency graph** (per agent, [`dep_graph`]): the state graph
//!    transformed into a data-and-control DAG — branching states promoted to
//!    condition vertices, state vertices contracted, read/write hazards
//!    turned into edges, per-variable output tasks grouped, transitive
//!    reduction applied.
//! 3. **Model graph** ([`model_graph`]): the union of all agents' dependency
//!    graphs framed by `StartModel`/`FinishModel`, with message vertices
//!    replaced by paired sync/clear tasks.
//!
//! # Graph representation
//!
//! [`TaskGraph`] is an arena: vertices and edges are dense integer handles
//! (`VertexId`, `EdgeId` from `xm-core`) into parallel vectors, with liveness
//! flags for removal.  Transitive reduction compacts into a fresh arena, so
//! handles are only meaningful relative to one graph value.

pub mod algo;
pub mod dep_graph;
pub mod dependency;
pub mod digraph;
pub mod dot;
pub mod error;
pub mod model_graph;
pub mod state_graph;
pub mod task;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dep_graph::DependencyGraph;
pub use dependency::{DepKind, Dependency};
pub use digraph::TaskGraph;
pub use error::{GraphError, GraphResult};
pub use model_graph::ModelGraph;
pub use state_graph::StateGraph;
pub use task::{Task, TaskKind};

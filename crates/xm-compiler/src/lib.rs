//! `xm-compiler` — the front door of the rust_xm model compiler.
//!
//! [`compile`] takes a parsed [`Model`](xm_model::Model) through the whole
//! pipeline:
//!
//! ```text
//! validate ─→ per-agent state graphs ─→ dependency graphs
//!          ─→ model graph ─→ ordered task list + dependency map
//! ```
//!
//! The result is a [`CompiledModel`]: the validated model, every
//! intermediate graph (kept for diagnostics and GraphViz output), and the
//! executor-ready task list.  [`CompiledModel::register`] drives an
//! executor through `xm-sched`'s registrar boundary; [`collaborators`]
//! holds the analogous surfaces for the memory manager and the
//! message-board manager.
//!
//! The compiler is single-threaded and deterministic, performs no I/O
//! except the explicit GraphViz writers, and owns no process globals — a
//! process may compile any number of models independently.

pub mod collaborators;
pub mod compiler;
pub mod error;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use collaborators::{
    register_boards, register_memory, BoardRegistrar, ElemType, MemoryRegistrar,
};
pub use compiler::{compile, CompiledModel};
pub use error::{CompileError, CompileResult};

pub use xm_sched::{BoardOp, IoOp, MemoryAccess, TaskRegistrar};
pub use xm_validate::{MemoryAccessPolicy, ValidationOptions};

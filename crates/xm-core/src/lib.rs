//! `xm-core` — foundational types for the `rust_xm` model compiler.
//!
//! This crate is a dependency of every other `xm-*` crate.  It intentionally
//! has no `xm-*` dependencies and no required external ones (only optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                         |
//! |------------|--------------------------------------------------|
//! | [`ids`]    | `VertexId`, `EdgeId`, `TaskId`                   |
//! | [`naming`] | Identifier character rules, reserved names       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod ids;
pub mod naming;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ids::{EdgeId, TaskId, VertexId};
pub use naming::{name_is_allowed, ITERATION_UNIT};

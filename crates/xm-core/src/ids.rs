//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  `VertexId` and `EdgeId` are dense
//! arena handles into a graph's parallel vectors; the inner integer is `pub`
//! so hot paths can index directly via `id.0 as usize`, but callers should
//! prefer the `.index()` helper for clarity.
//!
//! Transitive reduction rebuilds a graph, so `VertexId`s and `EdgeId`s are
//! only meaningful relative to one graph value.  `TaskId`s are assigned once
//! by the task emitter and are stable for the lifetime of a task list.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the maximum value.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a vertex in a task graph's arena.  Max ~4.3 billion vertices.
    pub struct VertexId(u32);
}

typed_id! {
    /// Index of a directed edge in a task graph's arena.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Position of a task in an emitted task list.  Dense: 0..task_count.
    pub struct TaskId(u64);
}

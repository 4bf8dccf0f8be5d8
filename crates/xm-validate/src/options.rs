//! Validation policy switches.

/// What to do with a function that declares no memory-access block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MemoryAccessPolicy {
    /// Promote the agent's entire memory to read-write and log a warning.
    /// Safe but serialises the function against everything; this matches
    /// the historical behaviour, so it is the default.
    #[default]
    Lenient,
    /// Reject the function.  Forces models to declare access so the
    /// scheduler can actually extract parallelism.
    Strict,
}

/// Options accepted by [`validate`](crate::validate).
#[derive(Clone, Debug, Default)]
pub struct ValidationOptions {
    pub memory_access: MemoryAccessPolicy,
}

impl ValidationOptions {
    pub fn strict_memory_access() -> Self {
        Self { memory_access: MemoryAccessPolicy::Strict }
    }
}

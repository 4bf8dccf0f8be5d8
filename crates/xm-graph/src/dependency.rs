//! `Dependency` — the payload attached to every task-graph edge.

/// Why one task must run before another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DepKind {
    /// State-machine ordering.  Present only while the state graph is being
    /// transformed; none survive in a finished dependency graph.
    State,
    /// Message post or read.
    Communication,
    /// Writer feeding an output task.
    Data,
    /// Start/finish framing.
    Init,
    /// A condition vertex dominating its guarded successors.
    Condition,
    /// Read-after-write or write-after-read on one memory variable.
    Variable,
    /// Structural edge with no runtime meaning (left unlabelled in output).
    Blank,
}

/// An edge label: a human-readable name plus the dependency kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dependency {
    /// State name, message name, `"Start"`/`"End"`, `"Condition"`, `"Data"`
    /// or empty, depending on `kind`.
    pub name: String,
    pub kind: DepKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DepKind) -> Self {
        Self { name: name.into(), kind }
    }

    /// Label rendered on graph output; blank edges stay unlabelled.
    pub fn graph_label(&self) -> Option<&str> {
        match self.kind {
            DepKind::Blank => None,
            _ => Some(&self.name),
        }
    }
}

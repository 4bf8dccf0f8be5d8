//! Mapping from task kinds to executor queues.

use xm_graph::TaskKind;

/// The executor runs one FIFO queue per class of work.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskQueue {
    /// Agent transition functions and branch conditions.
    AgentFunction,
    /// Message-board sync and clear operations.
    MessageBoard,
    /// Population I/O and iteration framing.
    Io,
}

/// The queue an emitted task belongs to.  `None` for structural kinds that
/// never reach an emitted list (states, variables, raw messages, per-agent
/// framing).
pub fn queue_for(kind: TaskKind) -> Option<TaskQueue> {
    match kind {
        TaskKind::Function | TaskKind::Condition => Some(TaskQueue::AgentFunction),
        TaskKind::MessageSync | TaskKind::MessageClear => Some(TaskQueue::MessageBoard),
        TaskKind::IoPopWrite | TaskKind::StartModel | TaskKind::FinishModel => {
            Some(TaskQueue::Io)
        }
        TaskKind::State
        | TaskKind::Variable
        | TaskKind::Message
        | TaskKind::StartAgent
        | TaskKind::FinishAgent => None,
    }
}

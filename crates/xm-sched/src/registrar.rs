//! The executor-facing registration boundary.
//!
//! The compiler does not own a worker pool; it drives one through
//! [`TaskRegistrar`], calling a creation method exactly once per emitted
//! task, `add_dependency` exactly once per dependency pair, and
//! `finalise()` last.  Implementations map these onto their own task
//! handles and access-control machinery.

use std::collections::BTreeSet;

use xm_core::TaskId;
use xm_graph::TaskKind;

use crate::emit::{TaskIdMap, TaskList};
use crate::error::{SchedError, SchedResult};

/// Population-I/O operation of an io task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IoOp {
    /// Iteration entry (`StartModel`).
    Init,
    /// Iteration exit (`FinishModel`).
    Fin,
    /// Export a group of agent variables (`IoPopWrite`).
    Output,
}

/// Message-board operation of a board task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardOp {
    Sync,
    Clear,
}

/// The per-task access manifest: which memory an agent task may touch and
/// which boards it may read or post.
#[derive(Copy, Clone, Debug)]
pub struct MemoryAccess<'a> {
    /// Variables readable but not writable.
    pub read_only_vars: &'a BTreeSet<String>,
    /// Variables readable and writable.
    pub write_vars: &'a BTreeSet<String>,
    pub input_messages: &'a BTreeSet<String>,
    pub output_messages: &'a BTreeSet<String>,
}

/// An executor that accepts tasks and dependencies from the compiler.
pub trait TaskRegistrar {
    /// Register an agent function or condition task.  `function_name` keys
    /// the implementation's function-pointer table.
    fn create_agent_task(
        &mut self,
        task_name: &str,
        agent_name: &str,
        function_name: &str,
        access: MemoryAccess<'_>,
    ) -> SchedResult<()>;

    /// Register an I/O task.  `vars` is empty for `Init`/`Fin` and names the
    /// exported variable group for `Output`.
    fn create_io_task(
        &mut self,
        task_name: &str,
        agent_name: &str,
        vars: &BTreeSet<String>,
        op: IoOp,
    ) -> SchedResult<()>;

    /// Register a message-board task.
    fn create_message_board_task(
        &mut self,
        task_name: &str,
        message_name: &str,
        op: BoardOp,
    ) -> SchedResult<()>;

    /// Declare that `child` must wait for `parent`.
    fn add_dependency(&mut self, child: TaskId, parent: TaskId) -> SchedResult<()>;

    /// Called last.  After this no tasks or dependencies may be added.
    fn finalise(&mut self) -> SchedResult<()>;
}

/// Drive `registrar` from an emitted task list: one creation call per task
/// (in list order), one `add_dependency` per pair, then `finalise()`.
pub fn register_task_list<R: TaskRegistrar>(
    list: &TaskList,
    dependencies: &TaskIdMap,
    registrar: &mut R,
) -> SchedResult<()> {
    let no_vars = BTreeSet::new();

    for task in list.iter() {
        let task_name = task.full_name();
        match task.kind {
            TaskKind::Function | TaskKind::Condition => registrar.create_agent_task(
                &task_name,
                &task.parent_name,
                &task.name,
                MemoryAccess {
                    read_only_vars: &task.read_vars,
                    write_vars: &task.write_vars,
                    input_messages: &task.input_messages,
                    output_messages: &task.output_messages,
                },
            )?,
            TaskKind::StartModel => {
                registrar.create_io_task(&task_name, &task.parent_name, &no_vars, IoOp::Init)?
            }
            TaskKind::FinishModel => {
                registrar.create_io_task(&task_name, &task.parent_name, &no_vars, IoOp::Fin)?
            }
            TaskKind::IoPopWrite => registrar.create_io_task(
                &task_name,
                &task.parent_name,
                &task.write_vars,
                IoOp::Output,
            )?,
            TaskKind::MessageSync => {
                registrar.create_message_board_task(&task_name, &task.name, BoardOp::Sync)?
            }
            TaskKind::MessageClear => {
                registrar.create_message_board_task(&task_name, &task.name, BoardOp::Clear)?
            }
            // Structural kinds never reach an emitted list.
            TaskKind::State
            | TaskKind::Variable
            | TaskKind::Message
            | TaskKind::StartAgent
            | TaskKind::FinishAgent => {
                return Err(SchedError::Registration {
                    task: task_name,
                    detail: format!("structural task kind {:?} in emitted list", task.kind),
                });
            }
        }
    }

    for (child, parent) in dependencies.iter() {
        registrar.add_dependency(child, parent)?;
    }

    registrar.finalise()
}

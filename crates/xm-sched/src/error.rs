//! Scheduling-surface errors.

use thiserror::Error;
use xm_core::TaskId;

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("failed to register task '{task}': {detail}")]
    Registration { task: String, detail: String },

    #[error("failed to add dependency {child} -> {parent}: {detail}")]
    Dependency {
        child: TaskId,
        parent: TaskId,
        detail: String,
    },

    #[error("executor rejected finalisation: {0}")]
    Finalise(String),
}

pub type SchedResult<T> = Result<T, SchedError>;

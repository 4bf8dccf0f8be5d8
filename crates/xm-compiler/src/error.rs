//! Pipeline errors.

use thiserror::Error;
use xm_graph::GraphError;
use xm_validate::ValidationReport;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The model failed validation; the report lists every problem found.
    #[error("model validation failed:\n{0}")]
    Validation(#[from] ValidationReport),

    /// Graph assembly failed after validation (cross-agent cycle).
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type CompileResult<T> = Result<T, CompileError>;

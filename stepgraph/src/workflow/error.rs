//! Workflow handle errors.

use thiserror::Error;

use crate::error::GraphError;
use crate::service::ServiceError;
use crate::workflow::WorkflowStatus;

/// Error from a `Workflow` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// The operation is not allowed in the workflow's current status.
    #[error("cannot {operation} a workflow in status {status}")]
    InvalidLifecycle {
        status: WorkflowStatus,
        operation: &'static str,
    },

    /// The execution belongs to another state machine.
    #[error("execution {execution_arn} was not started from {state_machine_arn}")]
    ForeignExecution {
        execution_arn: String,
        state_machine_arn: String,
    },

    /// Names are 1 to 80 characters without whitespace or reserved characters.
    #[error("invalid workflow name: {0}")]
    InvalidName(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WorkflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

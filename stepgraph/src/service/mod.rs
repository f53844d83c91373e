//! Remote orchestration service abstraction.
//!
//! The `Workflow` handle never talks to a transport directly: it calls an
//! [`OrchestrationService`]. [`InMemoryOrchestrationService`] mimics the remote
//! service for tests, demos and dry runs; [`RetryingService`] wraps any
//! implementation with backoff and per-call timeouts.

mod error;
mod in_memory;
mod retrying;
mod simulate;

pub use error::ServiceError;
pub use in_memory::InMemoryOrchestrationService;
pub use retrying::{RetryConfig, RetryingService};

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Opaque identity reference (IAM role ARN) passed through to the service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoleArn(String);

impl RoleArn {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleArn {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoleArn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Status of a remote execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Aborted,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
            Self::Aborted => "ABORTED",
        }
    }

    /// Everything but `Running`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of `describe_execution`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDescription {
    pub execution_arn: String,
    pub state_machine_arn: String,
    pub name: String,
    pub status: ExecutionStatus,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Kind of an execution history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HistoryEventKind {
    ExecutionStarted,
    StateEntered,
    StateExited,
    TaskFailed,
    ExecutionSucceeded,
    ExecutionFailed,
}

impl fmt::Display for HistoryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One entry of an execution history, ordered by `id` (starting at 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub id: u64,
    pub previous_event_id: u64,
    #[serde(rename = "type")]
    pub kind: HistoryEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Remote orchestration service: state machine CRUD plus execution queries.
///
/// Definitions are passed as rendered JSON text, exactly as the remote API expects.
/// Implementations: [`InMemoryOrchestrationService`], [`RetryingService`] (wrapper).
///
/// **Interaction**: Called by `Workflow` and `Execution`; never by the graph layer.
#[async_trait]
pub trait OrchestrationService: Send + Sync {
    /// Registers a state machine; returns its ARN. Names are unique per account.
    async fn create_state_machine(
        &self,
        name: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<String, ServiceError>;

    async fn update_state_machine(
        &self,
        state_machine_arn: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<(), ServiceError>;

    async fn delete_state_machine(&self, state_machine_arn: &str) -> Result<(), ServiceError>;

    /// Starts an execution; returns the execution ARN. `name` defaults to a
    /// service-generated one.
    async fn start_execution(
        &self,
        state_machine_arn: &str,
        input: &Value,
        name: Option<&str>,
    ) -> Result<String, ServiceError>;

    async fn describe_execution(
        &self,
        execution_arn: &str,
    ) -> Result<ExecutionDescription, ServiceError>;

    /// History events ordered by id.
    async fn get_execution_history(
        &self,
        execution_arn: &str,
    ) -> Result<Vec<HistoryEvent>, ServiceError>;
}

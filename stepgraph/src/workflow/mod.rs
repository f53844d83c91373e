//! Workflow handle: a named graph plus role, rendered and driven through an
//! orchestration service.
//!
//! Lifecycle: `Draft` → `create` → `Created` → `execute` → `ExecutionStarted` →
//! `wait_for_completion` → `Completed` / `Failed`. Once created, the workflow can
//! `execute` again or `delete` back to `Draft` from any later status, including
//! `ExecutionStarted` after a failed wait. Operations outside that order fail with
//! `WorkflowError::InvalidLifecycle` without calling the service.

mod error;
mod execution;

pub use error::WorkflowError;
pub use execution::{Execution, PollConfig};

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::graph::{render_document, DocumentOptions, StateGraph};
use crate::service::{ExecutionDescription, ExecutionStatus, OrchestrationService, RoleArn};

const MAX_NAME_LEN: usize = 80;
const AFTER_CREATE: &[WorkflowStatus] = &[
    WorkflowStatus::Created,
    WorkflowStatus::ExecutionStarted,
    WorkflowStatus::Completed,
    WorkflowStatus::Failed,
];
const RESERVED_NAME_CHARS: &[char] = &[
    '<', '>', '{', '}', '[', ']', '?', '*', '"', '#', '%', '\\', '^', '|', '~', '`', '$', '&',
    ',', ';', ':', '/',
];

/// Local lifecycle status of a [`Workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStatus {
    Draft,
    Created,
    ExecutionStarted,
    Completed,
    Failed,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Snapshot returned by [`Workflow::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDescription {
    pub name: String,
    pub status: WorkflowStatus,
    pub role: RoleArn,
    pub state_machine_arn: Option<String>,
}

/// Named workflow: root graph, role and lifecycle.
///
/// The name must be unique per account in the remote service; `create` surfaces
/// the service's rejection when it is not.
///
/// **Interaction**: Owns a `StateGraph`; calls an `OrchestrationService`; hands out
/// `Execution` handles.
pub struct Workflow {
    name: String,
    graph: StateGraph,
    role: RoleArn,
    options: DocumentOptions,
    service: Arc<dyn OrchestrationService>,
    poll: PollConfig,
    status: WorkflowStatus,
    state_machine_arn: Option<String>,
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("state_machine_arn", &self.state_machine_arn)
            .finish_non_exhaustive()
    }
}

impl Workflow {
    /// New workflow in `Draft`. Fails with `InvalidName` for names that are empty,
    /// longer than 80 characters, or contain whitespace or reserved characters.
    pub fn new(
        name: impl Into<String>,
        graph: StateGraph,
        role: impl Into<RoleArn>,
        service: Arc<dyn OrchestrationService>,
    ) -> Result<Self, WorkflowError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            graph,
            role: role.into(),
            options: DocumentOptions::default(),
            service,
            poll: PollConfig::default(),
            status: WorkflowStatus::Draft,
            state_machine_arn: None,
        })
    }

    /// Top-level `Comment` of the rendered document.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.options.comment = Some(comment.into());
        self
    }

    /// Top-level `TimeoutSeconds` of the rendered document.
    pub fn with_timeout_seconds(mut self, seconds: u32) -> Self {
        self.options.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn role(&self) -> &RoleArn {
        &self.role
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn state_machine_arn(&self) -> Option<&str> {
        self.state_machine_arn.as_deref()
    }

    pub fn describe(&self) -> WorkflowDescription {
        WorkflowDescription {
            name: self.name.clone(),
            status: self.status,
            role: self.role.clone(),
            state_machine_arn: self.state_machine_arn.clone(),
        }
    }

    /// Validates the graph and renders the full document.
    pub fn to_document(&self) -> Result<Value, WorkflowError> {
        self.graph.validate()?;
        Ok(render_document(&self.graph, &self.options))
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, WorkflowError> {
        let doc = self.to_document()?;
        let json = if pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(json)
    }

    /// Registers the state machine and returns its ARN.
    ///
    /// Calling it again once created returns the known ARN without a remote call.
    pub async fn create(&mut self) -> Result<String, WorkflowError> {
        if let Some(arn) = &self.state_machine_arn {
            tracing::warn!(
                workflow = %self.name,
                state_machine_arn = %arn,
                "workflow already created"
            );
            return Ok(arn.clone());
        }
        self.require(&[WorkflowStatus::Draft], "create")?;
        let definition = self.to_json(false)?;
        let arn = self
            .service
            .create_state_machine(&self.name, &definition, &self.role)
            .await?;
        tracing::info!(workflow = %self.name, state_machine_arn = %arn, "workflow created");
        self.state_machine_arn = Some(arn.clone());
        self.status = WorkflowStatus::Created;
        Ok(arn)
    }

    /// Replaces the graph and/or role. In `Created` the remote definition is
    /// updated too; in `Draft` only the local handle changes.
    pub async fn update(
        &mut self,
        graph: Option<StateGraph>,
        role: Option<RoleArn>,
    ) -> Result<(), WorkflowError> {
        self.require(&[WorkflowStatus::Draft, WorkflowStatus::Created], "update")?;
        let graph = graph.unwrap_or_else(|| self.graph.clone());
        let role = role.unwrap_or_else(|| self.role.clone());
        if let Some(arn) = &self.state_machine_arn {
            graph.validate()?;
            let definition = serde_json::to_string(&render_document(&graph, &self.options))?;
            self.service
                .update_state_machine(arn, &definition, &role)
                .await?;
            tracing::info!(workflow = %self.name, state_machine_arn = %arn, "workflow updated");
        }
        self.graph = graph;
        self.role = role;
        Ok(())
    }

    /// Starts an execution with `input`; `name` defaults to a service-generated one.
    ///
    /// Allowed while a previous execution is still running; the remote service
    /// runs executions independently.
    pub async fn execute(
        &mut self,
        input: Value,
        name: Option<&str>,
    ) -> Result<Execution, WorkflowError> {
        self.require(AFTER_CREATE, "execute")?;
        let arn = self.created_arn("execute")?;
        let execution_arn = self.service.start_execution(&arn, &input, name).await?;
        tracing::info!(workflow = %self.name, execution_arn = %execution_arn, "execution started");
        self.status = WorkflowStatus::ExecutionStarted;
        Ok(self.handle(execution_arn, arn))
    }

    /// Handle for an execution of this workflow's state machine, e.g. one whose
    /// `Execution` from [`execute`](Self::execute) was dropped.
    pub fn execution(
        &self,
        execution_arn: impl Into<String>,
    ) -> Result<Execution, WorkflowError> {
        let arn = self.created_arn("attach to an execution of")?;
        Ok(self.handle(execution_arn.into(), arn))
    }

    /// Polls `execution` to a terminal status and records the outcome.
    ///
    /// On a polling error the status stays `ExecutionStarted`; `execute`, `delete`
    /// and another `wait_for_completion` remain available.
    pub async fn wait_for_completion(
        &mut self,
        execution: &Execution,
    ) -> Result<ExecutionDescription, WorkflowError> {
        self.require(&[WorkflowStatus::ExecutionStarted], "wait for")?;
        let arn = self.created_arn("wait for")?;
        if execution.state_machine_arn() != arn {
            return Err(WorkflowError::ForeignExecution {
                execution_arn: execution.arn().to_string(),
                state_machine_arn: arn,
            });
        }
        let description = execution.wait().await?;
        self.status = match description.status {
            ExecutionStatus::Succeeded => WorkflowStatus::Completed,
            _ => WorkflowStatus::Failed,
        };
        tracing::info!(
            workflow = %self.name,
            execution_arn = %description.execution_arn,
            status = %description.status,
            "execution finished"
        );
        Ok(description)
    }

    /// Deletes the remote state machine and returns the handle to `Draft`.
    pub async fn delete(&mut self) -> Result<(), WorkflowError> {
        self.require(AFTER_CREATE, "delete")?;
        let arn = self.created_arn("delete")?;
        self.service.delete_state_machine(&arn).await?;
        tracing::info!(workflow = %self.name, state_machine_arn = %arn, "workflow deleted");
        self.state_machine_arn = None;
        self.status = WorkflowStatus::Draft;
        Ok(())
    }

    fn require(
        &self,
        allowed: &[WorkflowStatus],
        operation: &'static str,
    ) -> Result<(), WorkflowError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidLifecycle {
                status: self.status,
                operation,
            })
        }
    }

    fn handle(&self, execution_arn: String, state_machine_arn: String) -> Execution {
        Execution::new(
            execution_arn,
            state_machine_arn,
            Arc::clone(&self.service),
            self.poll,
        )
    }

    fn created_arn(&self, operation: &'static str) -> Result<String, WorkflowError> {
        self.state_machine_arn
            .clone()
            .ok_or(WorkflowError::InvalidLifecycle {
                status: self.status,
                operation,
            })
    }
}

fn validate_name(name: &str) -> Result<(), WorkflowError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(WorkflowError::InvalidName(format!(
            "'{}' must be 1 to {} characters",
            name, MAX_NAME_LEN
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || RESERVED_NAME_CHARS.contains(c))
    {
        return Err(WorkflowError::InvalidName(format!(
            "'{}' contains reserved character {:?}",
            name, c
        )));
    }
    Ok(())
}

//! In-memory orchestration service.
//!
//! Keeps state machines and executions in `DashMap`s. Executions are simulated
//! synchronously when started (see `simulate`); `describe_execution` can be told
//! to report `RUNNING` for a number of polls first so callers exercise their
//! polling loops.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{json, Value};

use super::simulate;
use super::{
    ExecutionDescription, ExecutionStatus, HistoryEvent, HistoryEventKind, OrchestrationService,
    RoleArn, ServiceError,
};

const ARN_PREFIX: &str = "arn:aws:states:us-east-1:000000000000";

struct StateMachineRecord {
    name: String,
    definition: Value,
    role: RoleArn,
}

struct ExecutionRecord {
    description: ExecutionDescription,
    history: Vec<HistoryEvent>,
    running_polls: u32,
}

/// Mimics the remote service: unique names, stored definitions, simulated runs.
///
/// **Interaction**: Used as `Arc<dyn OrchestrationService>` by `Workflow` in tests,
/// examples and the CLI `simulate` command.
///
/// **In-Memory**: All data stored in memory, lost when the service is dropped.
pub struct InMemoryOrchestrationService {
    machines: DashMap<String, StateMachineRecord>,
    executions: DashMap<String, ExecutionRecord>,
    execution_counter: AtomicU64,
    transient_failures: AtomicU32,
    fail_tasks: bool,
    running_polls: u32,
}

impl Default for InMemoryOrchestrationService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrchestrationService {
    pub fn new() -> Self {
        Self {
            machines: DashMap::new(),
            executions: DashMap::new(),
            execution_counter: AtomicU64::new(0),
            transient_failures: AtomicU32::new(0),
            fail_tasks: false,
            running_polls: 0,
        }
    }

    /// Every Task state fails with `States.TaskFailed` (after its retriers); the
    /// execution then follows the matching catcher or fails.
    pub fn with_task_failures(mut self, fail: bool) -> Self {
        self.fail_tasks = fail;
        self
    }

    /// `describe_execution` reports `RUNNING` for the first `polls` calls of each
    /// execution, and the history holds only `ExecutionStarted` meanwhile.
    pub fn with_running_polls(mut self, polls: u32) -> Self {
        self.running_polls = polls;
        self
    }

    /// The next `count` calls (any operation) fail with `Throttled`.
    pub fn with_transient_failures(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Stored definition of a state machine.
    pub fn definition(&self, state_machine_arn: &str) -> Option<Value> {
        self.machines
            .get(state_machine_arn)
            .map(|m| m.definition.clone())
    }

    pub fn role(&self, state_machine_arn: &str) -> Option<RoleArn> {
        self.machines.get(state_machine_arn).map(|m| m.role.clone())
    }

    pub fn state_machine_count(&self) -> usize {
        self.machines.len()
    }

    fn throttle(&self, operation: &str) -> Result<(), ServiceError> {
        let taken = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match taken {
            Ok(_) => Err(ServiceError::Throttled(format!("{}: rate exceeded", operation))),
            Err(_) => Ok(()),
        }
    }

    fn parse_definition(definition: &str) -> Result<Value, ServiceError> {
        let doc: Value = serde_json::from_str(definition)
            .map_err(|e| ServiceError::rejected("InvalidDefinition", e.to_string()))?;
        let start = doc.get("StartAt").and_then(Value::as_str);
        let states = doc.get("States").and_then(Value::as_object);
        match (start, states) {
            (Some(start), Some(states)) if states.contains_key(start) => Ok(doc),
            _ => Err(ServiceError::rejected(
                "InvalidDefinition",
                "StartAt must name a state in States",
            )),
        }
    }

    fn build_history(
        role: &RoleArn,
        input: &Value,
        trace: simulate::Trace,
    ) -> (Vec<HistoryEvent>, ExecutionStatus, Option<Value>, Option<(String, String)>) {
        let mut history = Vec::with_capacity(trace.steps.len() + 2);
        let mut push = |kind, state_name, details| {
            let id = history.len() as u64 + 1;
            history.push(HistoryEvent {
                id,
                previous_event_id: id - 1,
                kind,
                state_name,
                details,
            });
        };
        push(
            HistoryEventKind::ExecutionStarted,
            None,
            Some(json!({"input": input, "roleArn": role})),
        );
        for step in trace.steps {
            push(step.kind, step.state_name, step.details);
        }
        match trace.outcome {
            Ok(output) => {
                push(
                    HistoryEventKind::ExecutionSucceeded,
                    None,
                    Some(json!({"output": output})),
                );
                (history, ExecutionStatus::Succeeded, Some(output), None)
            }
            Err(failure) => {
                push(
                    HistoryEventKind::ExecutionFailed,
                    None,
                    Some(json!({"error": failure.error, "cause": failure.cause})),
                );
                (
                    history,
                    ExecutionStatus::Failed,
                    None,
                    Some((failure.error, failure.cause)),
                )
            }
        }
    }
}

#[async_trait]
impl OrchestrationService for InMemoryOrchestrationService {
    async fn create_state_machine(
        &self,
        name: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<String, ServiceError> {
        self.throttle("CreateStateMachine")?;
        let definition = Self::parse_definition(definition)?;
        let arn = format!("{}:stateMachine:{}", ARN_PREFIX, name);
        match self.machines.entry(arn.clone()) {
            Entry::Occupied(_) => Err(ServiceError::rejected(
                "StateMachineAlreadyExists",
                format!("State Machine Already Exists: '{}'", arn),
            )),
            Entry::Vacant(slot) => {
                slot.insert(StateMachineRecord {
                    name: name.to_string(),
                    definition,
                    role: role.clone(),
                });
                tracing::debug!(state_machine_arn = %arn, "in-memory state machine created");
                Ok(arn)
            }
        }
    }

    async fn update_state_machine(
        &self,
        state_machine_arn: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<(), ServiceError> {
        self.throttle("UpdateStateMachine")?;
        let definition = Self::parse_definition(definition)?;
        let mut machine = self
            .machines
            .get_mut(state_machine_arn)
            .ok_or_else(|| ServiceError::NotFound(state_machine_arn.to_string()))?;
        machine.definition = definition;
        machine.role = role.clone();
        Ok(())
    }

    async fn delete_state_machine(&self, state_machine_arn: &str) -> Result<(), ServiceError> {
        self.throttle("DeleteStateMachine")?;
        self.machines
            .remove(state_machine_arn)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(state_machine_arn.to_string()))
    }

    async fn start_execution(
        &self,
        state_machine_arn: &str,
        input: &Value,
        name: Option<&str>,
    ) -> Result<String, ServiceError> {
        self.throttle("StartExecution")?;
        let (machine_name, definition, role) = {
            let machine = self
                .machines
                .get(state_machine_arn)
                .ok_or_else(|| ServiceError::NotFound(state_machine_arn.to_string()))?;
            (
                machine.name.clone(),
                machine.definition.clone(),
                machine.role.clone(),
            )
        };
        let n = self.execution_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let execution_name = name
            .map(String::from)
            .unwrap_or_else(|| format!("execution-{:04}", n));
        let execution_arn = format!("{}:execution:{}:{}", ARN_PREFIX, machine_name, execution_name);

        let trace = simulate::run(&definition, input, self.fail_tasks);
        let (history, status, output, failure) = Self::build_history(&role, input, trace);
        let (error, cause) = match failure {
            Some((e, c)) => (Some(e), Some(c)),
            None => (None, None),
        };
        let record = ExecutionRecord {
            description: ExecutionDescription {
                execution_arn: execution_arn.clone(),
                state_machine_arn: state_machine_arn.to_string(),
                name: execution_name,
                status,
                input: input.clone(),
                output,
                error,
                cause,
            },
            history,
            running_polls: self.running_polls,
        };
        match self.executions.entry(execution_arn.clone()) {
            Entry::Occupied(_) => Err(ServiceError::rejected(
                "ExecutionAlreadyExists",
                format!("Execution Already Exists: '{}'", execution_arn),
            )),
            Entry::Vacant(slot) => {
                slot.insert(record);
                tracing::debug!(
                    execution_arn = %execution_arn,
                    %status,
                    "in-memory execution started"
                );
                Ok(execution_arn)
            }
        }
    }

    async fn describe_execution(
        &self,
        execution_arn: &str,
    ) -> Result<ExecutionDescription, ServiceError> {
        self.throttle("DescribeExecution")?;
        let mut record = self
            .executions
            .get_mut(execution_arn)
            .ok_or_else(|| ServiceError::NotFound(execution_arn.to_string()))?;
        if record.running_polls > 0 {
            record.running_polls -= 1;
            return Ok(ExecutionDescription {
                status: ExecutionStatus::Running,
                output: None,
                error: None,
                cause: None,
                ..record.description.clone()
            });
        }
        Ok(record.description.clone())
    }

    async fn get_execution_history(
        &self,
        execution_arn: &str,
    ) -> Result<Vec<HistoryEvent>, ServiceError> {
        self.throttle("GetExecutionHistory")?;
        let record = self
            .executions
            .get(execution_arn)
            .ok_or_else(|| ServiceError::NotFound(execution_arn.to_string()))?;
        let visible = if record.running_polls > 0 {
            record.history.len().min(1)
        } else {
            record.history.len()
        };
        Ok(record.history[..visible].to_vec())
    }
}

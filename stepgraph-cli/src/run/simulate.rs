//! Simulated run: create the workflow on an in-memory service, execute it, wait
//! and collect the history.

use std::sync::Arc;

use serde_json::Value;
use stepgraph::{
    ExecutionDescription, HistoryEvent, InMemoryOrchestrationService, RetryingService, Workflow,
};

use super::Error;
use crate::config::RunConfig;
use crate::hello_world::hello_world_graph;

/// Status polls the simulated service answers with `RUNNING` before finishing.
const SIMULATED_RUNNING_POLLS: u32 = 2;

/// Outcome of [`simulate`].
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub state_machine_arn: String,
    pub description: ExecutionDescription,
    pub events: Vec<HistoryEvent>,
}

impl SimulationReport {
    /// Multi-line text: status line, output or error, then one line per event.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("state machine: {}", self.state_machine_arn),
            format!(
                "execution: {} ({})",
                self.description.execution_arn, self.description.status
            ),
        ];
        if let Some(output) = &self.description.output {
            lines.push(format!("output: {}", output));
        }
        if let Some(error) = &self.description.error {
            lines.push(format!(
                "error: {} ({})",
                error,
                self.description.cause.as_deref().unwrap_or("")
            ));
        }
        for event in &self.events {
            let state = event.state_name.as_deref().unwrap_or("-");
            lines.push(format!("  #{} {:?} {}", event.id, event.kind, state));
        }
        lines.join("\n")
    }
}

/// Create, execute and wait for the hello-world workflow on an in-memory service.
///
/// Requires a role ARN. With `fail_tasks` every Task state fails, so the run
/// exercises the retry and catch paths.
pub async fn simulate(
    config: &RunConfig,
    input: Value,
    fail_tasks: bool,
) -> Result<SimulationReport, Error> {
    let role = config.require_role_arn()?;
    let graph = hello_world_graph(&config.lambda_function)?;
    let service = RetryingService::new(
        InMemoryOrchestrationService::new()
            .with_task_failures(fail_tasks)
            .with_running_polls(SIMULATED_RUNNING_POLLS),
        config.retry_config(),
    );
    let mut workflow = Workflow::new(config.workflow_name.clone(), graph, role, Arc::new(service))?
        .with_poll_config(config.poll_config());

    let state_machine_arn = workflow.create().await?;
    let execution = workflow.execute(input, None).await?;
    let description = workflow.wait_for_completion(&execution).await?;
    let events = execution.list_events().await?;
    tracing::debug!(events = events.len(), status = %description.status, "simulation finished");

    Ok(SimulationReport {
        state_machine_arn,
        description,
        events,
    })
}

//! Lifecycle ordering: create, update, execute, wait, delete.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stepgraph::{
    ExecutionStatus, InMemoryOrchestrationService, PollConfig, RetryConfig, RetryingService,
    ServiceError, State, StateGraph, Workflow, WorkflowError, WorkflowStatus,
};

use crate::common::{review_graph, workflow_on, ROLE};

fn stuck_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_polls: Some(2),
    }
}

/// **Scenario**: Create registers once; a second create returns the same ARN.
#[tokio::test]
async fn create_is_idempotent_on_the_handle() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    let mut wf = workflow_on(service.clone());
    let arn = wf.create().await.unwrap();
    assert_eq!(arn, "arn:aws:states:us-east-1:000000000000:stateMachine:ReviewFlow");
    assert_eq!(wf.status(), WorkflowStatus::Created);
    assert_eq!(wf.create().await.unwrap(), arn);
    assert_eq!(service.state_machine_count(), 1);
    let stored = service.definition(&arn).unwrap();
    assert_eq!(stored, wf.to_document().unwrap());
}

/// **Scenario**: A second workflow with a taken name gets the service rejection verbatim.
#[tokio::test]
async fn name_collision_is_reported_by_service() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    workflow_on(service.clone()).create().await.unwrap();
    let mut twin = workflow_on(service.clone());
    match twin.create().await {
        Err(WorkflowError::Service(ServiceError::Rejected { code, .. })) => {
            assert_eq!(code, "StateMachineAlreadyExists")
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(twin.status(), WorkflowStatus::Draft);
}

/// **Scenario**: Happy path: create, execute, wait, execute again.
#[tokio::test]
async fn execute_and_complete() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    let mut wf = workflow_on(service);
    wf.create().await.unwrap();

    let execution = wf
        .execute(json!({"approved": true}), Some("first"))
        .await
        .unwrap();
    assert_eq!(wf.status(), WorkflowStatus::ExecutionStarted);
    assert_eq!(execution.state_machine_arn(), wf.state_machine_arn().unwrap());

    let done = wf.wait_for_completion(&execution).await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Succeeded);
    assert_eq!(done.name, "first");
    assert_eq!(wf.status(), WorkflowStatus::Completed);

    let again = wf.execute(json!({"approved": false}), None).await.unwrap();
    let done = wf.wait_for_completion(&again).await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Failed);
    assert_eq!(wf.status(), WorkflowStatus::Failed);
}

/// **Scenario**: A failing task is caught and the execution ends in the catch target.
#[tokio::test]
async fn task_failure_follows_catch() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_task_failures(true));
    let mut wf = workflow_on(service);
    wf.create().await.unwrap();
    let execution = wf.execute(json!({"approved": true}), None).await.unwrap();
    let done = wf.wait_for_completion(&execution).await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Failed);
    assert_eq!(done.error.as_deref(), Some("NotifyError"));
    assert_eq!(done.cause.as_deref(), Some("notification failed"));
}

/// **Scenario**: Update pushes the new definition while created; rejected after a run.
#[tokio::test]
async fn update_only_before_execution() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    let mut wf = workflow_on(service.clone());

    let tiny = StateGraph::from_chain(State::succeed("Only")).unwrap();
    wf.update(Some(tiny.clone()), None).await.unwrap();
    assert_eq!(wf.graph().start_at(), "Only");

    let arn = wf.create().await.unwrap();
    wf.update(Some(review_graph()), Some("arn:aws:iam::000000000000:role/Other".into()))
        .await
        .unwrap();
    assert_eq!(service.definition(&arn).unwrap()["StartAt"], "Start");
    assert_eq!(service.role(&arn).unwrap().as_str(), "arn:aws:iam::000000000000:role/Other");

    let execution = wf.execute(json!({}), None).await.unwrap();
    wf.wait_for_completion(&execution).await.unwrap();
    assert!(matches!(
        wf.update(Some(tiny), None).await,
        Err(WorkflowError::InvalidLifecycle { operation: "update", .. })
    ));
}

/// **Scenario**: Delete returns the handle to Draft so it can be created again.
#[tokio::test]
async fn delete_returns_to_draft() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    let mut wf = workflow_on(service.clone());
    wf.create().await.unwrap();
    wf.delete().await.unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Draft);
    assert_eq!(wf.state_machine_arn(), None);
    assert_eq!(service.state_machine_count(), 0);
    wf.create().await.unwrap();
    assert_eq!(service.state_machine_count(), 1);
}

/// **Scenario**: A retrying client absorbs throttling during create.
#[tokio::test]
async fn retrying_service_absorbs_throttling() {
    let inner = InMemoryOrchestrationService::new().with_transient_failures(2);
    let config = RetryConfig {
        base_delay: Duration::from_millis(1),
        ..RetryConfig::default()
    };
    let service = Arc::new(RetryingService::new(inner, config));
    let mut wf = Workflow::new("Throttled", review_graph(), ROLE, service.clone()).unwrap();
    wf.create().await.unwrap();
    assert_eq!(service.inner().state_machine_count(), 1);
}

/// **Scenario**: After a wait that times out, the workflow can still run again
/// and be deleted.
#[tokio::test]
async fn failed_wait_does_not_block_the_workflow() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_running_polls(100));
    let mut wf = workflow_on(service.clone()).with_poll_config(stuck_poll());
    wf.create().await.unwrap();

    let first = wf.execute(json!({"approved": true}), None).await.unwrap();
    let err = wf.wait_for_completion(&first).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Service(ServiceError::Timeout(_))));
    assert_eq!(wf.status(), WorkflowStatus::ExecutionStarted);
    let first_arn = first.arn().to_string();
    drop(first);

    let second = wf.execute(json!({"approved": false}), None).await.unwrap();
    assert_ne!(second.arn(), first_arn);
    assert_eq!(wf.status(), WorkflowStatus::ExecutionStarted);

    let again = wf.execution(first_arn.clone()).unwrap();
    assert_eq!(again.arn(), first_arn);
    assert_eq!(again.describe().await.unwrap().status, ExecutionStatus::Running);

    assert!(matches!(
        wf.update(None, None).await,
        Err(WorkflowError::InvalidLifecycle { operation: "update", .. })
    ));
    wf.delete().await.unwrap();
    assert_eq!(wf.status(), WorkflowStatus::Draft);
    assert_eq!(service.state_machine_count(), 0);
    wf.update(None, None).await.unwrap();
}

/// **Scenario**: Waiting on an execution of another state machine is rejected
/// and leaves the status unchanged.
#[tokio::test]
async fn wait_rejects_execution_of_another_workflow() {
    let service = Arc::new(InMemoryOrchestrationService::new());
    let mut wf = workflow_on(service.clone());
    let mut other = Workflow::new("OtherFlow", review_graph(), ROLE, service).unwrap();
    wf.create().await.unwrap();
    other.create().await.unwrap();

    let own = wf.execute(json!({}), None).await.unwrap();
    let foreign = other.execute(json!({}), None).await.unwrap();
    match wf.wait_for_completion(&foreign).await {
        Err(WorkflowError::ForeignExecution {
            execution_arn,
            state_machine_arn,
        }) => {
            assert_eq!(execution_arn, foreign.arn());
            assert_eq!(Some(state_machine_arn.as_str()), wf.state_machine_arn());
        }
        other => panic!("expected ForeignExecution, got {:?}", other),
    }
    assert_eq!(wf.status(), WorkflowStatus::ExecutionStarted);
    assert!(wf.wait_for_completion(&own).await.is_ok());
}

/// **Scenario**: A handle cannot be attached before the workflow is created.
#[test]
fn execution_handle_requires_created_workflow() {
    let wf = workflow_on(Arc::new(InMemoryOrchestrationService::new()));
    assert!(matches!(
        wf.execution("arn:aws:states:us-east-1:000000000000:execution:ReviewFlow:x"),
        Err(WorkflowError::InvalidLifecycle { status: WorkflowStatus::Draft, .. })
    ));
}

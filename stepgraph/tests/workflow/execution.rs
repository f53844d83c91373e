//! Execution handle: history, polling, watching.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stepgraph::{
    ExecutionStatus, HistoryEventKind, InMemoryOrchestrationService, PollConfig, ServiceError,
};
use tokio_stream::StreamExt;

use crate::common::workflow_on;

/// **Scenario**: History lists every state entered and exited, in order.
#[tokio::test]
async fn history_follows_taken_path() {
    let mut wf = workflow_on(Arc::new(InMemoryOrchestrationService::new()));
    wf.create().await.unwrap();
    let execution = wf.execute(json!({"approved": true}), None).await.unwrap();
    let events = execution.list_events().await.unwrap();

    assert_eq!(events.first().unwrap().kind, HistoryEventKind::ExecutionStarted);
    assert_eq!(events.last().unwrap().kind, HistoryEventKind::ExecutionSucceeded);
    let entered: Vec<_> = events
        .iter()
        .filter(|e| e.kind == HistoryEventKind::StateEntered)
        .filter_map(|e| e.state_name.as_deref())
        .collect();
    assert_eq!(entered, vec!["Start", "Check", "Notify", "Approved"]);
}

/// **Scenario**: Waiting polls through RUNNING until the final status.
#[tokio::test]
async fn wait_polls_until_terminal() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_running_polls(3));
    let mut wf = workflow_on(service);
    wf.create().await.unwrap();
    let execution = wf.execute(json!({"approved": true}), None).await.unwrap();
    assert_eq!(execution.describe().await.unwrap().status, ExecutionStatus::Running);
    let done = execution.wait().await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Succeeded);
}

/// **Scenario**: Exceeding the poll budget is a timeout.
#[tokio::test]
async fn wait_gives_up_after_max_polls() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_running_polls(10));
    let mut wf = workflow_on(service).with_poll_config(PollConfig {
        interval: Duration::from_millis(1),
        max_polls: Some(2),
    });
    wf.create().await.unwrap();
    let execution = wf.execute(json!({}), None).await.unwrap();
    assert!(matches!(execution.wait().await, Err(ServiceError::Timeout(_))));
}

/// **Scenario**: Watching streams every event exactly once, then ends.
#[tokio::test]
async fn watch_streams_all_events() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_running_polls(2));
    let mut wf = workflow_on(service);
    wf.create().await.unwrap();
    let execution = wf.execute(json!({"approved": false}), None).await.unwrap();

    let streamed: Vec<_> = execution
        .watch()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|e| e.unwrap())
        .collect();
    let ids: Vec<_> = streamed.iter().map(|e| e.id).collect();
    assert_eq!(ids, (1..=streamed.len() as u64).collect::<Vec<_>>());
    assert_eq!(streamed, execution.list_events().await.unwrap());
    assert_eq!(streamed.last().unwrap().kind, HistoryEventKind::ExecutionFailed);
}

/// **Scenario**: Watching a run that never finishes ends with a timeout once the
/// poll budget is spent, after delivering the events seen so far.
#[tokio::test]
async fn watch_gives_up_after_max_polls() {
    let service = Arc::new(InMemoryOrchestrationService::new().with_running_polls(1_000_000));
    let mut wf = workflow_on(service).with_poll_config(PollConfig {
        interval: Duration::from_millis(1),
        max_polls: Some(2),
    });
    wf.create().await.unwrap();
    let execution = wf.execute(json!({}), None).await.unwrap();

    let items = tokio::time::timeout(
        Duration::from_secs(5),
        execution.watch().collect::<Vec<_>>(),
    )
    .await
    .expect("watch should end once max_polls is reached");
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].as_ref().map(|e| e.kind),
        Ok(HistoryEventKind::ExecutionStarted)
    );
    assert_eq!(
        items[1],
        Err(ServiceError::Timeout(Duration::from_millis(2)))
    );
}

/// **Scenario**: Describing an unknown execution is NotFound.
#[tokio::test]
async fn unknown_execution_is_not_found() {
    use stepgraph::OrchestrationService;
    let service = InMemoryOrchestrationService::new();
    assert!(matches!(
        service.describe_execution("arn:missing").await,
        Err(ServiceError::NotFound(_))
    ));
}

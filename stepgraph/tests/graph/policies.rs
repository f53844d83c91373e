//! Retry and catch attachment.

use stepgraph::{CatchPolicy, GraphError, RetryPolicy, State, StateGraph};

/// **Scenario**: Retry then Catch on a Task keeps both lists in attachment order.
#[test]
fn retry_and_catch_keep_attachment_order() {
    let mut task = State::task("T", "arn:aws:states:::lambda:invoke");
    task.add_retry(RetryPolicy::new(["Lambda.ServiceException"]))
        .unwrap()
        .add_retry(RetryPolicy::new(["States.ALL"]).with_max_attempts(1))
        .unwrap()
        .add_catch(CatchPolicy::new(["States.Timeout"], State::fail("TimedOut")))
        .unwrap()
        .add_catch(
            CatchPolicy::new(["States.ALL"], State::fail("Other")).with_result_path("$.error"),
        )
        .unwrap();
    let doc = StateGraph::from_chain(task).unwrap().to_document();
    let node = &doc["States"]["T"];
    assert_eq!(node["Retry"][0]["ErrorEquals"][0], "Lambda.ServiceException");
    assert_eq!(node["Retry"][1]["ErrorEquals"][0], "States.ALL");
    assert_eq!(node["Retry"][1]["MaxAttempts"], 1);
    assert_eq!(node["Catch"][0]["Next"], "TimedOut");
    assert_eq!(node["Catch"][1]["Next"], "Other");
    assert_eq!(node["Catch"][1]["ResultPath"], "$.error");
    let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["Type", "Resource", "End", "Retry", "Catch"]);
}

/// **Scenario**: Nothing may follow a States.ALL retrier.
#[test]
fn states_all_must_be_last() {
    let mut task = State::task("T", "arn");
    task.add_retry(RetryPolicy::new(["States.ALL"])).unwrap();
    let err = task
        .add_retry(RetryPolicy::new(["States.TaskFailed"]))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPolicy(_)));
}

/// **Scenario**: Out-of-range retry fields are rejected.
#[test]
fn invalid_retry_fields_are_rejected() {
    let mut task = State::task("T", "arn");
    assert!(matches!(
        task.add_retry(RetryPolicy::new(["E"]).with_backoff_rate(0.5)),
        Err(GraphError::InvalidPolicy(_))
    ));
    assert!(matches!(
        task.add_retry(RetryPolicy::new(["E"]).with_interval_seconds(0)),
        Err(GraphError::InvalidPolicy(_))
    ));
    assert!(matches!(
        task.add_retry(RetryPolicy::new(Vec::<String>::new())),
        Err(GraphError::InvalidPolicy(_))
    ));
    assert!(task.retries().is_empty());
}

/// **Scenario**: Only Task, Parallel and Map accept policies.
#[test]
fn pass_state_rejects_policies() {
    let mut pass = State::pass("P");
    assert!(matches!(
        pass.add_retry(RetryPolicy::new(["E"])),
        Err(GraphError::Configuration(_))
    ));
    assert!(matches!(
        pass.add_catch(CatchPolicy::new(["E"], "P")),
        Err(GraphError::Configuration(_))
    ));
}

/// **Scenario**: Parallel states accept catchers leading to inline fallbacks.
#[test]
fn parallel_catch_target_is_hoisted() {
    let mut parallel = State::parallel("P");
    parallel
        .add_branch(State::pass("A"))
        .unwrap()
        .add_catch(CatchPolicy::new(["States.ALL"], State::fail("BranchFailed")))
        .unwrap();
    let graph = StateGraph::from_chain(parallel).unwrap();
    assert!(graph.contains("BranchFailed"));
    assert_eq!(graph.to_document()["States"]["P"]["Catch"][0]["Next"], "BranchFailed");
}

//! Shared fixtures: a short review workflow and a service handle.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stepgraph::{
    chain, CatchPolicy, ChoiceRule, FailState, InMemoryOrchestrationService, PollConfig,
    RetryPolicy, State, StateGraph, Workflow,
};

pub const ROLE: &str = "arn:aws:iam::000000000000:role/StepFunctionsWorkflowExecutionRole";

/// Start → Check; `$.approved` true → Notify (Lambda) → Approved, otherwise Rejected.
pub fn review_graph() -> StateGraph {
    let mut notify = State::lambda("Notify", json!({"FunctionName": "notify"}));
    notify
        .add_retry(RetryPolicy::new(["States.TaskFailed"]).with_max_attempts(1))
        .unwrap()
        .add_catch(CatchPolicy::new(
            ["States.ALL"],
            State::new(
                "NotifyFailed",
                FailState::new()
                    .with_error("NotifyError")
                    .with_cause("notification failed"),
            ),
        ))
        .unwrap();
    let mut check = State::choice("Check");
    check
        .add_choice(
            ChoiceRule::boolean_equals("$.approved", true),
            chain(vec![notify, State::succeed("Approved")]).unwrap(),
        )
        .unwrap()
        .set_default(State::fail("Rejected"))
        .unwrap();
    StateGraph::from_chain(chain(vec![State::pass("Start"), check]).unwrap()).unwrap()
}

pub fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        max_polls: Some(50),
    }
}

pub fn workflow_on(service: Arc<InMemoryOrchestrationService>) -> Workflow {
    Workflow::new("ReviewFlow", review_graph(), ROLE, service)
        .unwrap()
        .with_poll_config(fast_poll())
}

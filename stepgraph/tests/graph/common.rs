//! Shared fixtures: the hello-world tutorial graph.

use serde_json::json;
use stepgraph::{
    chain, CatchPolicy, ChoiceRule, RetryPolicy, State, StateGraph, WaitDuration,
};

pub const CHOICE_ID: &str = "Is this Hello World example?";
pub const LAMBDA_ID: &str = "Convert HelloWorld to Base64";

/// Pass → Choice; happy path Wait → Parallel[Hello, World] → Lambda → Succeed,
/// sad path Fail. The Lambda retries `States.TaskFailed` and catches it into a Fail.
pub fn hello_world() -> StateGraph {
    let mut parallel = State::parallel("MyParallelState");
    parallel
        .add_branch(State::pass("Hello"))
        .unwrap()
        .add_branch(State::pass("World"))
        .unwrap();

    let mut lambda = State::lambda(
        LAMBDA_ID,
        json!({"FunctionName": "MyLambda", "Payload": {"input": "HelloWorld"}}),
    );
    lambda
        .add_retry(
            RetryPolicy::new(["States.TaskFailed"])
                .with_interval_seconds(15)
                .with_max_attempts(2)
                .with_backoff_rate(4.0),
        )
        .unwrap()
        .add_catch(CatchPolicy::new(
            ["States.TaskFailed"],
            State::fail("LambdaTaskFailed"),
        ))
        .unwrap();

    let happy_path = chain(vec![
        State::wait("Wait for 3 seconds", WaitDuration::Seconds(3)),
        parallel,
        lambda,
        State::succeed("HelloWorldSuccessful"),
    ])
    .unwrap();

    let mut choice = State::choice(CHOICE_ID);
    choice
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", true),
            happy_path,
        )
        .unwrap()
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", false),
            State::fail("HelloWorldFailed"),
        )
        .unwrap();

    StateGraph::from_chain(chain(vec![State::pass("MyPassState"), choice]).unwrap()).unwrap()
}

//! The hello-world tutorial workflow.
//!
//! `MyPassState` → Choice on `$.IsHelloWorldExample`: `true` runs the happy path
//! (Wait 3s → Parallel[Hello, World] → Lambda → Succeed), `false` ends in
//! `HelloWorldFailed`. The Lambda retries `States.TaskFailed` (15s, 2 attempts,
//! backoff 4.0) and catches it into `LambdaTaskFailed`.

use serde_json::json;
use stepgraph::{
    chain, CatchPolicy, ChoiceRule, GraphError, RetryPolicy, State, StateGraph, WaitDuration,
};

pub const START_ID: &str = "MyPassState";
pub const CHOICE_ID: &str = "Is this Hello World example?";
pub const LAMBDA_ID: &str = "Convert HelloWorld to Base64";

/// Builds the tutorial graph invoking `lambda_function`.
pub fn hello_world_graph(lambda_function: &str) -> Result<StateGraph, GraphError> {
    let mut parallel = State::parallel("MyParallelState");
    parallel
        .add_branch(State::pass("Hello"))?
        .add_branch(State::pass("World"))?;

    let mut lambda = State::lambda(
        LAMBDA_ID,
        json!({
            "FunctionName": lambda_function,
            "Payload": {"input": "HelloWorld"}
        }),
    );
    lambda
        .add_retry(
            RetryPolicy::new(["States.TaskFailed"])
                .with_interval_seconds(15)
                .with_max_attempts(2)
                .with_backoff_rate(4.0),
        )?
        .add_catch(CatchPolicy::new(
            ["States.TaskFailed"],
            State::fail("LambdaTaskFailed"),
        ))?;

    let happy_path = chain(vec![
        State::wait("Wait for 3 seconds", WaitDuration::Seconds(3)),
        parallel,
        lambda,
        State::succeed("HelloWorldSuccessful"),
    ])?;

    let mut choice = State::choice(CHOICE_ID);
    choice
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", true),
            happy_path,
        )?
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", false),
            State::fail("HelloWorldFailed"),
        )?;

    StateGraph::from_chain(chain(vec![State::pass(START_ID), choice])?)
}

//! Hello-world tutorial: build the graph, print the document, create the state
//! machine on an in-memory service, run it and stream its history.
//!
//! ```bash
//! cargo run -p stepgraph-examples --example hello_world
//! cargo run -p stepgraph-examples --example hello_world -- false
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stepgraph::{
    chain, CatchPolicy, ChoiceRule, InMemoryOrchestrationService, PollConfig, RetryPolicy, State,
    StateGraph, WaitDuration, Workflow,
};
use stepgraph_examples::{init, role_arn_from_env};
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init();
    let is_hello_world = std::env::args().nth(1).map_or(true, |a| a != "false");

    let mut parallel = State::parallel("MyParallelState");
    parallel
        .add_branch(State::pass("Hello"))?
        .add_branch(State::pass("World"))?;

    let mut lambda = State::lambda(
        "Convert HelloWorld to Base64",
        json!({"FunctionName": "MyLambda", "Payload": {"input": "HelloWorld"}}),
    );
    lambda
        .add_retry(
            RetryPolicy::new(["States.TaskFailed"])
                .with_interval_seconds(15)
                .with_max_attempts(2)
                .with_backoff_rate(4.0),
        )?
        .add_catch(CatchPolicy::new(["States.TaskFailed"], State::fail("LambdaTaskFailed")))?;

    let mut choice = State::choice("Is this Hello World example?");
    choice
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", true),
            chain(vec![
                State::wait("Wait for 3 seconds", WaitDuration::Seconds(3)),
                parallel,
                lambda,
                State::succeed("HelloWorldSuccessful"),
            ])?,
        )?
        .add_choice(
            ChoiceRule::boolean_equals("$.IsHelloWorldExample", false),
            State::fail("HelloWorldFailed"),
        )?;

    let graph = StateGraph::from_chain(chain(vec![State::pass("MyPassState"), choice])?)?;
    for warning in graph.warnings() {
        println!("warning: {}", warning);
    }

    let mut workflow = Workflow::new(
        "MyWorkflow_v12341",
        graph,
        role_arn_from_env(),
        Arc::new(InMemoryOrchestrationService::new().with_running_polls(1)),
    )?
    .with_poll_config(PollConfig {
        interval: Duration::from_millis(100),
        max_polls: Some(50),
    });
    println!("{}", workflow.to_json(true)?);

    let arn = workflow.create().await?;
    println!("created {}", arn);

    let execution = workflow
        .execute(json!({"IsHelloWorldExample": is_hello_world}), None)
        .await?;
    let mut events = execution.watch();
    while let Some(event) = events.next().await {
        let event = event?;
        println!(
            "#{:<3} {:<20} {}",
            event.id,
            format!("{:?}", event.kind),
            event.state_name.as_deref().unwrap_or("")
        );
    }

    let description = workflow.wait_for_completion(&execution).await?;
    println!("--- {} ({:?})", description.status, workflow.status());
    if let Some(output) = description.output {
        println!("output: {}", output);
    }
    if let Some(error) = description.error {
        println!("error: {}", error);
    }

    workflow.delete().await?;
    Ok(())
}

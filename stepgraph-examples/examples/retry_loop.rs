//! Polling loop with a Choice back-edge, run through a retrying service that
//! absorbs throttled calls.
//!
//! `Check` is a Task; `Done?` loops back to `Wait` until `$.status` is "DONE".
//! The in-memory service returns the input unchanged, so the example starts with
//! `status = DONE` and also prints the rendered loop.
//!
//! ```bash
//! cargo run -p stepgraph-examples --example retry_loop
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stepgraph::{
    chain, ChoiceRule, InMemoryOrchestrationService, PollConfig, RetryConfig,
    RetryingService, State, StateGraph, WaitDuration, Workflow,
};
use stepgraph_examples::{init, role_arn_from_env};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init();

    let mut done = State::choice("Done?");
    done.add_choice(
        ChoiceRule::string_equals("$.status", "DONE"),
        State::succeed("Finished"),
    )?
    .set_default("Wait")?;

    let graph = StateGraph::from_chain(chain(vec![
        State::wait("Wait", WaitDuration::Seconds(10)),
        State::task("Check", "arn:aws:lambda:us-east-1:012345678901:function:CheckStatus"),
        done,
    ])?)?;
    println!("{}", graph.to_json(true)?);

    let service = RetryingService::new(
        InMemoryOrchestrationService::new().with_transient_failures(2),
        RetryConfig {
            base_delay: Duration::from_millis(50),
            ..RetryConfig::default()
        },
    );
    let mut workflow = Workflow::new("PollingLoop", graph, role_arn_from_env(), Arc::new(service))?
        .with_poll_config(PollConfig {
            interval: Duration::from_millis(50),
            max_polls: Some(20),
        });

    workflow.create().await?;
    let execution = workflow.execute(json!({"status": "DONE"}), Some("first")).await?;
    let description = workflow.wait_for_completion(&execution).await?;
    println!("{} -> {}", execution.arn(), description.status);
    for event in execution.list_events().await? {
        println!("  #{} {:?} {}", event.id, event.kind, event.state_name.unwrap_or_default());
    }
    Ok(())
}

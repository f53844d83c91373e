//! Run entry points: render, validate and simulate the hello-world workflow.
//!
//! Each takes a resolved [`RunConfig`]; [`run_with_options`] loads it from env and
//! applies overrides first.

pub use crate::config::Error;

mod config_summary;
mod simulate;

use std::sync::Arc;

use stepgraph::{InMemoryOrchestrationService, ValidationReport, Workflow};

use crate::config::{RunConfig, RunOptions};
use crate::hello_world::hello_world_graph;

pub use config_summary::ConfigSummary;
pub use simulate::{simulate, SimulationReport};

/// Render the hello-world workflow document. Pretty-printed unless `compact`.
///
/// Uses the configured role or a placeholder; nothing is sent to a service.
pub fn render(config: &RunConfig, compact: bool) -> Result<String, Error> {
    let workflow = local_workflow(config)?;
    Ok(workflow.to_json(!compact)?)
}

/// Build and validate the hello-world graph, returning advisory warnings.
pub fn validate(config: &RunConfig) -> Result<ValidationReport, Error> {
    let graph = hello_world_graph(&config.lambda_function)?;
    Ok(graph.validate()?)
}

/// Load config from env, apply `options`, and print a summary to stderr when verbose.
pub fn config_with_options(options: &RunOptions) -> Result<RunConfig, Error> {
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    if config.verbose {
        ConfigSummary::from(&config).print_to_stderr();
    }
    Ok(config)
}

/// Load `.env`, resolve config and render the document.
pub fn run_with_options(options: &RunOptions, compact: bool) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let config = config_with_options(options)?;
    render(&config, compact)
}

fn local_workflow(config: &RunConfig) -> Result<Workflow, Error> {
    let graph = hello_world_graph(&config.lambda_function)?;
    let workflow = Workflow::new(
        config.workflow_name.clone(),
        graph,
        config.role_arn_or_placeholder(),
        Arc::new(InMemoryOrchestrationService::new()),
    )?;
    Ok(workflow)
}

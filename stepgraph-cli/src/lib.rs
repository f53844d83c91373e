//! stepgraph-cli library: hello-world workflow, run config and the commands
//! behind the `stepgraph` binary.
//!
//! Reads settings from env / .env (`STEPGRAPH_*`), builds the hello-world graph and
//! renders, validates or simulates it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), stepgraph_cli::Error> {
//! let config = stepgraph_cli::RunConfig::from_env()?;
//! println!("{}", stepgraph_cli::render(&config, false)?);
//! let input = serde_json::json!({"IsHelloWorldExample": true});
//! let report = stepgraph_cli::simulate(&config, input, false).await?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

mod cli;
mod config;
mod hello_world;
mod logging;
mod run;

pub use cli::{execute_command, run_cli, Cli, Command};
pub use config::{Error, RunConfig, RunOptions, PLACEHOLDER_ROLE_ARN};
pub use hello_world::{hello_world_graph, CHOICE_ID, LAMBDA_ID, START_ID};
pub use logging::init_tracing;
pub use run::{
    config_with_options, render, run_with_options, simulate, validate, ConfigSummary,
    SimulationReport,
};

#[cfg(test)]
mod tests;

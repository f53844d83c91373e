//! Command-line surface: `render`, `validate` and `simulate`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::{Error, RunConfig, RunOptions};
use crate::logging::init_tracing;
use crate::run::{config_with_options, render, simulate, validate};

#[derive(Parser, Debug)]
#[command(name = "stepgraph")]
#[command(about = "Render, validate and simulate the hello-world state machine")]
pub struct Cli {
    /// Debug logs for the library (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Role ARN (overrides STEPGRAPH_ROLE_ARN)
    #[arg(long, global = true, value_name = "ARN")]
    pub role_arn: Option<String>,

    /// State machine name (overrides STEPGRAPH_WORKFLOW_NAME)
    #[arg(long, global = true, value_name = "NAME")]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the workflow document
    Render {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
        /// Write the document to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Validate the graph and list warnings
    Validate,
    /// Create and run the workflow against an in-memory service
    Simulate {
        /// Execution input as JSON
        #[arg(long, value_name = "JSON", default_value = "{}")]
        input: String,
        /// Make every Task state fail
        #[arg(long)]
        fail: bool,
    },
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            role_arn: self.role_arn.clone(),
            workflow_name: self.name.clone(),
            verbose: self.verbose,
            ..RunOptions::default()
        }
    }
}

/// Runs one command with a resolved config and returns what should go to stdout.
pub async fn execute_command(config: &RunConfig, command: &Command) -> Result<String, Error> {
    match command {
        Command::Render { compact, output } => {
            let json = render(config, *compact)?;
            match output {
                Some(path) => {
                    std::fs::write(path, &json)?;
                    tracing::info!(path = %path.display(), "document written");
                    Ok(format!("wrote {}", path.display()))
                }
                None => Ok(json),
            }
        }
        Command::Validate => {
            let report = validate(config)?;
            if report.is_clean() {
                return Ok("ok: no warnings".to_string());
            }
            let mut lines = vec![format!("ok: {} warning(s)", report.warnings().len())];
            lines.extend(report.warnings().iter().map(|w| format!("  warning: {}", w)));
            Ok(lines.join("\n"))
        }
        Command::Simulate { input, fail } => {
            let input: Value = serde_json::from_str(input)?;
            let report = simulate(config, input, *fail).await?;
            Ok(report.render())
        }
    }
}

/// Loads `.env`, resolves config, initializes logging and runs the command.
pub async fn run_cli(cli: Cli) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let config = config_with_options(&cli.run_options())?;
    init_tracing(config.verbose)?;
    execute_command(&config, &cli.command).await
}

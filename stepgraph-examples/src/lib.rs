//! Shared helpers for the stepgraph examples.
//!
//! Run an example with `cargo run -p stepgraph-examples --example hello_world`.

use stepgraph::RoleArn;

/// Role used when `STEPGRAPH_ROLE_ARN` is not set.
pub const DEFAULT_ROLE_ARN: &str =
    "arn:aws:iam::012345678901:role/StepFunctionsWorkflowExecutionRole";

/// Loads `.env` (if present) and installs a stderr subscriber honoring `RUST_LOG`
/// (default `info`). Safe to call more than once.
pub fn init() {
    dotenv::dotenv().ok();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `STEPGRAPH_ROLE_ARN`, or [`DEFAULT_ROLE_ARN`].
pub fn role_arn_from_env() -> RoleArn {
    std::env::var("STEPGRAPH_ROLE_ARN")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(RoleArn::from)
        .unwrap_or_else(|| RoleArn::new(DEFAULT_ROLE_ARN))
}

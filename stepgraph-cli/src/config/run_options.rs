//! Optional overrides for a run (CLI args or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options). Callers
//! (the binary or tests) build a `RunOptions` and apply it to env-based config.

/// Optional overrides: role, names, polling and retry settings.
///
/// All fields are optional; only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Role ARN passed to the orchestration service.
    pub role_arn: Option<String>,
    /// State machine name.
    pub workflow_name: Option<String>,
    /// Lambda function invoked by the hello-world task.
    pub lambda_function: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub max_retries: Option<u32>,
    /// Enable debug logs for the library.
    pub verbose: bool,
}

//! Run config: role, workflow name, Lambda function, polling and retry settings.
//! Filled from env / .env, then overridden by [`RunOptions`](super::RunOptions).

use std::time::Duration;

use stepgraph::{PollConfig, RetryConfig, RoleArn};

use super::RunOptions;

/// Error type used for config loading and CLI runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Role used by `render` and `validate` when no role is configured.
pub const PLACEHOLDER_ROLE_ARN: &str =
    "arn:aws:iam::000000000000:role/StepFunctionsWorkflowExecutionRole";

const DEFAULT_WORKFLOW_NAME: &str = "MyWorkflow_v12341";
const DEFAULT_LAMBDA_FUNCTION: &str = "MyLambda";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

/// Settings for rendering, validating and simulating the hello-world workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Role ARN for the state machine. Required by `simulate`.
    pub role_arn: Option<String>,
    /// State machine name. Default: `MyWorkflow_v12341`.
    pub workflow_name: String,
    /// Lambda function name in the task parameters. Default: `MyLambda`.
    pub lambda_function: String,
    /// Delay between execution status polls.
    pub poll_interval: Duration,
    /// Retries for throttled or failed service calls.
    pub max_retries: u32,
    /// Timeout for each service call attempt.
    pub call_timeout: Duration,
    /// When true, library debug logs are enabled.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            role_arn: None,
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
            lambda_function: DEFAULT_LAMBDA_FUNCTION.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Fill config from env vars (and .env when loaded by the caller).
    ///
    /// `STEPGRAPH_ROLE_ARN`, `STEPGRAPH_WORKFLOW_NAME`, `STEPGRAPH_LAMBDA_FUNCTION`,
    /// `STEPGRAPH_POLL_INTERVAL_MS`, `STEPGRAPH_MAX_RETRIES`, `STEPGRAPH_CALL_TIMEOUT_MS`
    /// are all optional. A numeric variable that does not parse is an error.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        let role_arn = std::env::var("STEPGRAPH_ROLE_ARN")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let workflow_name =
            std::env::var("STEPGRAPH_WORKFLOW_NAME").unwrap_or(defaults.workflow_name);
        let lambda_function =
            std::env::var("STEPGRAPH_LAMBDA_FUNCTION").unwrap_or(defaults.lambda_function);
        let poll_interval_ms = parse_env("STEPGRAPH_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let max_retries = parse_env("STEPGRAPH_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        let call_timeout_ms = parse_env("STEPGRAPH_CALL_TIMEOUT_MS", DEFAULT_CALL_TIMEOUT_MS)?;

        Ok(Self {
            role_arn,
            workflow_name,
            lambda_function,
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_retries,
            call_timeout: Duration::from_millis(call_timeout_ms),
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions`; only set fields override.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(role) = &options.role_arn {
            self.role_arn = Some(role.clone());
        }
        if let Some(name) = &options.workflow_name {
            self.workflow_name = name.clone();
        }
        if let Some(function) = &options.lambda_function {
            self.lambda_function = function.clone();
        }
        if let Some(ms) = options.poll_interval_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(n) = options.max_retries {
            self.max_retries = n;
        }
        self.verbose = options.verbose;
    }

    /// Configured role, or an error naming the variable to set.
    pub fn require_role_arn(&self) -> Result<RoleArn, Error> {
        self.role_arn.as_deref().map(RoleArn::new).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "STEPGRAPH_ROLE_ARN is not set; configure it in .env or pass --role-arn",
            )
            .into()
        })
    }

    /// Configured role, or [`PLACEHOLDER_ROLE_ARN`].
    pub fn role_arn_or_placeholder(&self) -> RoleArn {
        RoleArn::new(self.role_arn.as_deref().unwrap_or(PLACEHOLDER_ROLE_ARN))
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            call_timeout: self.call_timeout,
            ..RetryConfig::default()
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            max_polls: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, Error> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} must be a non-negative integer, got '{}'", key, raw),
            )
            .into()
        }),
        Err(_) => Ok(default),
    }
}

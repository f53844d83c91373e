//! Human-readable summary of a [`RunConfig`], printed to stderr in verbose mode.

use std::fmt;

use crate::config::RunConfig;

/// Key/value view of the settings a run uses. The role is shown as `(unset)`
/// when missing so the output format is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    entries: Vec<(&'static str, String)>,
}

impl ConfigSummary {
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    pub fn print_to_stderr(&self) {
        eprintln!("{}", self);
    }
}

impl From<&RunConfig> for ConfigSummary {
    fn from(config: &RunConfig) -> Self {
        let entries = vec![
            ("workflow", config.workflow_name.clone()),
            ("lambda", config.lambda_function.clone()),
            (
                "role_arn",
                config
                    .role_arn
                    .clone()
                    .unwrap_or_else(|| "(unset)".to_string()),
            ),
            (
                "poll_interval_ms",
                config.poll_interval.as_millis().to_string(),
            ),
            ("max_retries", config.max_retries.to_string()),
            (
                "call_timeout_ms",
                config.call_timeout.as_millis().to_string(),
            ),
        ];
        Self { entries }
    }
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "[config] {}", line)
    }
}

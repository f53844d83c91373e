//! Retry and catch policies attached to Task, Parallel and Map states.
//!
//! Policies are plain values until attached; `State::add_retry` / `State::add_catch`
//! validate them and keep them in attachment order. The external runtime matches
//! errors against them first-to-last, so order is part of the contract.

use serde_json::{json, Map, Value};

use crate::error::GraphError;
use crate::state::NextStep;

/// Wildcard error name matching any error.
pub const STATES_ALL: &str = "States.ALL";

/// Retrier: which errors to retry, how long to wait and how many times.
///
/// Defaults follow the States language: interval 1s, 3 attempts, backoff 2.0.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    error_equals: Vec<String>,
    interval_seconds: u32,
    max_attempts: u32,
    backoff_rate: f64,
}

impl RetryPolicy {
    /// Creates a retrier for the given error names with default timing.
    pub fn new<I, E>(error_equals: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            error_equals: error_equals.into_iter().map(Into::into).collect(),
            interval_seconds: 1,
            max_attempts: 3,
            backoff_rate: 2.0,
        }
    }

    pub fn with_interval_seconds(mut self, seconds: u32) -> Self {
        self.interval_seconds = seconds;
        self
    }

    /// Zero disables retrying for the matched errors.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = rate;
        self
    }

    pub fn error_equals(&self) -> &[String] {
        &self.error_equals
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_rate(&self) -> f64 {
        self.backoff_rate
    }

    /// Checks numeric ranges and the error-name list.
    ///
    /// Returns `GraphError::InvalidPolicy` when the interval is zero, the backoff
    /// rate is below 1.0 (or not finite), or the error list is malformed.
    pub fn validate(&self) -> Result<(), GraphError> {
        check_error_equals("Retry", &self.error_equals)?;
        if self.interval_seconds == 0 {
            return Err(GraphError::invalid_policy(
                "Retry IntervalSeconds must be a positive integer",
            ));
        }
        if !self.backoff_rate.is_finite() || self.backoff_rate < 1.0 {
            return Err(GraphError::invalid_policy(format!(
                "Retry BackoffRate must be >= 1.0, got {}",
                self.backoff_rate
            )));
        }
        Ok(())
    }

    pub(crate) fn matches_all(&self) -> bool {
        self.error_equals.iter().any(|e| e == STATES_ALL)
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "ErrorEquals": self.error_equals,
            "IntervalSeconds": self.interval_seconds,
            "MaxAttempts": self.max_attempts,
            "BackoffRate": self.backoff_rate,
        })
    }
}

/// Catcher: which errors to catch and the fallback state to transition to.
///
/// The fallback is a [`NextStep`]: either an inline state/chain (hoisted into the
/// enclosing graph at build time) or the id of a state defined elsewhere.
#[derive(Debug, Clone)]
pub struct CatchPolicy {
    error_equals: Vec<String>,
    next: NextStep,
    result_path: Option<String>,
}

impl CatchPolicy {
    pub fn new<I, E>(error_equals: I, next: impl Into<NextStep>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            error_equals: error_equals.into_iter().map(Into::into).collect(),
            next: next.into(),
            result_path: None,
        }
    }

    /// Where to place the error output in the fallback state's input.
    pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn error_equals(&self) -> &[String] {
        &self.error_equals
    }

    pub fn next(&self) -> &NextStep {
        &self.next
    }

    pub(crate) fn next_mut(&mut self) -> &mut NextStep {
        &mut self.next
    }

    pub fn result_path(&self) -> Option<&str> {
        self.result_path.as_deref()
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        check_error_equals("Catch", &self.error_equals)?;
        if let Some(path) = &self.result_path {
            if !path.starts_with('$') {
                return Err(GraphError::invalid_policy(format!(
                    "Catch ResultPath must be a path starting with '$': {}",
                    path
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn matches_all(&self) -> bool {
        self.error_equals.iter().any(|e| e == STATES_ALL)
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut node = Map::new();
        node.insert("ErrorEquals".into(), json!(self.error_equals));
        node.insert("Next".into(), Value::String(self.next.target_id().to_string()));
        if let Some(path) = &self.result_path {
            node.insert("ResultPath".into(), Value::String(path.clone()));
        }
        Value::Object(node)
    }
}

fn check_error_equals(field: &str, errors: &[String]) -> Result<(), GraphError> {
    if errors.is_empty() {
        return Err(GraphError::invalid_policy(format!(
            "{} ErrorEquals must name at least one error",
            field
        )));
    }
    if errors.iter().any(|e| e.trim().is_empty()) {
        return Err(GraphError::invalid_policy(format!(
            "{} ErrorEquals contains an empty error name",
            field
        )));
    }
    if errors.len() > 1 && errors.iter().any(|e| e == STATES_ALL) {
        return Err(GraphError::invalid_policy(format!(
            "{} ErrorEquals: {} must appear alone",
            field, STATES_ALL
        )));
    }
    Ok(())
}

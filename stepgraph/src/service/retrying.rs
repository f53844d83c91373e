//! Retry and timeout wrapper for any orchestration service.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ExecutionDescription, HistoryEvent, OrchestrationService, RoleArn, ServiceError};

/// Backoff and timeout settings for [`RetryingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Applied to every attempt separately.
    pub call_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Wraps a service: each call runs under `tokio::time::timeout`, retryable
/// failures (see [`ServiceError::is_retryable`]) are retried with exponential
/// backoff, everything else is returned as-is.
///
/// `create_state_machine` is not retried after a timeout: the service may have
/// created the machine, and a second attempt would surface
/// `StateMachineAlreadyExists`. The caller gets `ServiceError::Timeout` and can
/// check the machine's state before trying again.
pub struct RetryingService<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: OrchestrationService> RetryingService<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    async fn call<T, F, Fut>(
        &self,
        operation: &'static str,
        attempt_call: F,
    ) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, ServiceError>> + Send,
        T: Send,
    {
        self.call_with(operation, true, attempt_call).await
    }

    /// `retry_timeouts = false` returns the first timeout instead of retrying it,
    /// for calls that are not safe to repeat when the outcome is unknown.
    async fn call_with<T, F, Fut>(
        &self,
        operation: &'static str,
        retry_timeouts: bool,
        mut attempt_call: F,
    ) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, ServiceError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            let result = tokio::time::timeout(self.config.call_timeout, attempt_call())
                .await
                .unwrap_or(Err(ServiceError::Timeout(self.config.call_timeout)));
            match result {
                Err(ServiceError::Timeout(d)) if !retry_timeouts => {
                    return Err(ServiceError::Timeout(d))
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying service call"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl<S: OrchestrationService> OrchestrationService for RetryingService<S> {
    async fn create_state_machine(
        &self,
        name: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<String, ServiceError> {
        self.call_with("CreateStateMachine", false, || {
            self.inner.create_state_machine(name, definition, role)
        })
        .await
    }

    async fn update_state_machine(
        &self,
        state_machine_arn: &str,
        definition: &str,
        role: &RoleArn,
    ) -> Result<(), ServiceError> {
        self.call("UpdateStateMachine", || {
            self.inner
                .update_state_machine(state_machine_arn, definition, role)
        })
        .await
    }

    async fn delete_state_machine(&self, state_machine_arn: &str) -> Result<(), ServiceError> {
        self.call("DeleteStateMachine", || {
            self.inner.delete_state_machine(state_machine_arn)
        })
        .await
    }

    async fn start_execution(
        &self,
        state_machine_arn: &str,
        input: &Value,
        name: Option<&str>,
    ) -> Result<String, ServiceError> {
        self.call("StartExecution", || {
            self.inner.start_execution(state_machine_arn, input, name)
        })
        .await
    }

    async fn describe_execution(
        &self,
        execution_arn: &str,
    ) -> Result<ExecutionDescription, ServiceError> {
        self.call("DescribeExecution", || {
            self.inner.describe_execution(execution_arn)
        })
        .await
    }

    async fn get_execution_history(
        &self,
        execution_arn: &str,
    ) -> Result<Vec<HistoryEvent>, ServiceError> {
        self.call("GetExecutionHistory", || {
            self.inner.get_execution_history(execution_arn)
        })
        .await
    }
}

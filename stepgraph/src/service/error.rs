//! Orchestration service errors.

use std::time::Duration;

use thiserror::Error;

/// Error returned by an [`OrchestrationService`](super::OrchestrationService) call.
///
/// `Rejected` carries the service's error code and message verbatim; the other
/// variants describe transport-level conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service refused the request (e.g. `StateMachineAlreadyExists`,
    /// `InvalidDefinition`, `ExecutionAlreadyExists`).
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    #[error("throttled: {0}")]
    Throttled(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not complete within the configured timeout.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// Unknown state machine or execution ARN.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Throttling, transport failures and timeouts may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Throttled(_) | Self::Transport(_) | Self::Timeout(_)
        )
    }
}

//! Handle to one remote execution: describe, history, polling and watching.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::service::{ExecutionDescription, HistoryEvent, OrchestrationService, ServiceError};

/// Polling cadence for [`Execution::wait`] and [`Execution::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Give up (with `ServiceError::Timeout`) after this many polls; `None` polls forever.
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_polls: None,
        }
    }
}

/// Returned by `Workflow::execute`. Cheap to clone; clones share the service.
#[derive(Clone)]
pub struct Execution {
    arn: String,
    state_machine_arn: String,
    service: Arc<dyn OrchestrationService>,
    poll: PollConfig,
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution")
            .field("arn", &self.arn)
            .field("state_machine_arn", &self.state_machine_arn)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl Execution {
    pub(crate) fn new(
        arn: String,
        state_machine_arn: String,
        service: Arc<dyn OrchestrationService>,
        poll: PollConfig,
    ) -> Self {
        Self {
            arn,
            state_machine_arn,
            service,
            poll,
        }
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// State machine this execution was started from.
    pub fn state_machine_arn(&self) -> &str {
        &self.state_machine_arn
    }

    pub async fn describe(&self) -> Result<ExecutionDescription, ServiceError> {
        self.service.describe_execution(&self.arn).await
    }

    /// Full ordered event history so far.
    pub async fn list_events(&self) -> Result<Vec<HistoryEvent>, ServiceError> {
        self.service.get_execution_history(&self.arn).await
    }

    /// Polls `describe` until the execution reaches a terminal status.
    pub async fn wait(&self) -> Result<ExecutionDescription, ServiceError> {
        let mut polls = 0u32;
        loop {
            let description = self.describe().await?;
            if description.status.is_terminal() {
                return Ok(description);
            }
            polls += 1;
            if let Some(max) = self.poll.max_polls {
                if polls >= max {
                    return Err(ServiceError::Timeout(self.poll.interval * polls));
                }
            }
            tracing::debug!(execution_arn = %self.arn, polls, "execution still running");
            tokio::time::sleep(self.poll.interval).await;
        }
    }

    /// Streams history events as they appear, until the execution is terminal and
    /// every event has been delivered. A service error is sent once and ends the
    /// stream; so does `ServiceError::Timeout` when `max_polls` runs out first.
    pub fn watch(&self) -> ReceiverStream<Result<HistoryEvent, ServiceError>> {
        let (tx, rx) = mpsc::channel(128);
        let execution = self.clone();

        tokio::spawn(async move {
            let mut last_seen = 0u64;
            let mut polls = 0u32;
            loop {
                let finished = match execution.describe().await {
                    Ok(d) => d.status.is_terminal(),
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
                let events = match execution.list_events().await {
                    Ok(events) => events,
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
                for event in events {
                    if event.id <= last_seen {
                        continue;
                    }
                    last_seen = event.id;
                    if tx.send(Ok(event)).await.is_err() {
                        return;
                    }
                }
                if finished {
                    return;
                }
                polls += 1;
                if let Some(max) = execution.poll.max_polls {
                    if polls >= max {
                        let waited = execution.poll.interval * polls;
                        let _ = tx.send(Err(ServiceError::Timeout(waited))).await;
                        return;
                    }
                }
                tokio::time::sleep(execution.poll.interval).await;
            }
        });

        ReceiverStream::new(rx)
    }
}

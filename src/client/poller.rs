//! Task polling.
//!
//! Checks a task's status on a fixed interval until the backend reports a
//! terminal status, then fetches the task's records.

use super::TaskApi;
use crate::error::PipelineError;
use crate::models::{Record, TaskHandle, TaskStatus};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Configuration for a polling sequence.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between non-terminal status checks.
    pub interval: Duration,
    /// Give up after this many non-terminal status checks. `None` polls until
    /// the backend reports a terminal status.
    pub max_attempts: Option<u32>,
    /// Treat a failed data fetch after completion as an empty result.
    pub empty_on_data_error: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: None,
            empty_on_data_error: true,
        }
    }
}

/// Waits for one task to finish.
pub struct Poller<'a, A: TaskApi + ?Sized> {
    api: &'a A,
    config: PollConfig,
}

impl<'a, A: TaskApi + ?Sized> Poller<'a, A> {
    pub fn new(api: &'a A, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Poll `task` until it completes and return its records.
    ///
    /// A status request that cannot complete ends polling immediately.
    pub async fn await_completion(&self, task: &TaskHandle) -> Result<Vec<Record>, PipelineError> {
        let mut attempts: u32 = 0;

        loop {
            let status = self.api.task_status(task).await.map_err(|e| {
                error!("Error getting task {} status: {}", task, e);
                e
            })?;
            attempts += 1;
            info!("Task {} status: {}", task, status);

            if status.is_terminal() {
                return match status {
                    TaskStatus::Completed => self.fetch_results(task).await,
                    _ => {
                        error!("Task {} failed.", task);
                        Err(PipelineError::TaskFailed(task.clone()))
                    }
                };
            }

            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    warn!("Giving up on task {} after {} status checks", task, attempts);
                    return Err(PipelineError::PollExhausted {
                        task: task.clone(),
                        attempts,
                    });
                }
            }

            debug!("Waiting {:?} before re-checking task {}", self.config.interval, task);
            tokio::time::sleep(self.config.interval).await;
        }
    }

    async fn fetch_results(&self, task: &TaskHandle) -> Result<Vec<Record>, PipelineError> {
        match self.api.task_data(task).await {
            Ok(records) => {
                info!("Fetched {} records for task {}", records.len(), task);
                Ok(records)
            }
            Err(e) if self.config.empty_on_data_error => {
                warn!("Error getting data for task {}: {}; continuing with no records", task, e);
                Ok(Vec::new())
            }
            Err(e) => {
                error!("Error getting data for task {}: {}", task, e);
                Err(e)
            }
        }
    }
}

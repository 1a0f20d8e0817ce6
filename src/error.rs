//! Errors raised by the submit, poll, and render pipeline.

use crate::models::TaskHandle;
use thiserror::Error;

/// Failure of one step of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request could not complete: connection, timeout, non-2xx, or an
    /// undecodable body.
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The backend reported the task as failed.
    #[error("task {0} failed")]
    TaskFailed(TaskHandle),

    /// The configured attempt bound was reached before a terminal status.
    #[error("task {task} not finished after {attempts} status checks")]
    PollExhausted { task: TaskHandle, attempts: u32 },

    #[error("invalid submission: {0}")]
    InvalidForm(String),

    #[error("failed to render chart: {0}")]
    Render(#[from] std::io::Error),
}

impl PipelineError {
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

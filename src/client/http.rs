//! HTTP implementation of the task API.

use super::TaskApi;
use crate::error::PipelineError;
use crate::models::{Record, SubmissionForm, TaskHandle, TaskStatus};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Path that starts a task from the submission form.
pub const SUBMIT_PATH: &str = "/submit-source-a";

/// Response to a successful submission.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: TaskHandle,
}

/// Response of the task status endpoint. Other task fields are ignored.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    /// A null or missing status means the task has not been picked up yet.
    #[serde(default)]
    status: Option<TaskStatus>,
}

impl StatusResponse {
    fn into_status(self) -> TaskStatus {
        self.status.unwrap_or(TaskStatus::Pending)
    }
}

/// Talks to the backend over HTTP with reqwest.
pub struct HttpTaskApi {
    base_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl HttpTaskApi {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| PipelineError::transport(base_url, format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn status_path(task: &TaskHandle) -> String {
        format!("/api/tasks/{}", task)
    }

    fn data_path(task: &TaskHandle) -> String {
        format!("/api/tasks/{}/data", task)
    }

    /// Map a send failure to a transport error naming the endpoint.
    fn send_error(&self, path: &str, e: reqwest::Error) -> PipelineError {
        let message = if e.is_timeout() {
            format!("request timed out after {}s", self.timeout_seconds)
        } else if e.is_connect() {
            format!("cannot connect to backend at {}", self.base_url)
        } else {
            format!("failed to send request: {}", e)
        };
        PipelineError::transport(path, message)
    }

    /// Check the status code and decode a JSON body.
    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, PipelineError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transport(
                path,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PipelineError::transport(path, format!("invalid response body: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PipelineError> {
        let response = self
            .http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.send_error(path, e))?;

        self.decode(path, response).await
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn submit(&self, form: &SubmissionForm) -> Result<TaskHandle, PipelineError> {
        let fields = form.fields();
        debug!("Submitting form: {:?}", fields);

        let response = self
            .http_client
            .post(self.url(SUBMIT_PATH))
            .form(&fields)
            .send()
            .await
            .map_err(|e| self.send_error(SUBMIT_PATH, e))?;

        let submitted: SubmitResponse = self.decode(SUBMIT_PATH, response).await?;
        debug!("Backend accepted task {}", submitted.task_id);
        Ok(submitted.task_id)
    }

    async fn task_status(&self, task: &TaskHandle) -> Result<TaskStatus, PipelineError> {
        let status: StatusResponse = self.get_json(&Self::status_path(task)).await?;
        Ok(status.into_status())
    }

    async fn task_data(&self, task: &TaskHandle) -> Result<Vec<Record>, PipelineError> {
        self.get_json(&Self::data_path(task)).await
    }
}

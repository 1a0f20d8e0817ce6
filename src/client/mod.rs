//! Backend task client.
//!
//! This module provides the `TaskApi` seam to the backend, its HTTP
//! implementation, and the poller that waits for a task to finish.

pub mod http;
pub mod poller;

pub use http::HttpTaskApi;
pub use poller::{PollConfig, Poller};

use crate::error::PipelineError;
use crate::models::{Record, SubmissionForm, TaskHandle, TaskStatus};
use async_trait::async_trait;

/// Operations the backend exposes for one task's lifecycle.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Start a task from a submitted form.
    async fn submit(&self, form: &SubmissionForm) -> Result<TaskHandle, PipelineError>;

    /// Query the current status of a task.
    async fn task_status(&self, task: &TaskHandle) -> Result<TaskStatus, PipelineError>;

    /// Fetch the records produced by a completed task.
    async fn task_data(&self, task: &TaskHandle) -> Result<Vec<Record>, PipelineError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend for exercising the poller and controller.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays queued statuses and result sets. Statuses are shared by all
    /// submissions; each data fetch takes the next queued result set.
    pub struct ScriptedApi {
        statuses: Mutex<VecDeque<Result<TaskStatus, String>>>,
        data: Mutex<VecDeque<Result<Vec<Record>, String>>>,
        submit_calls: AtomicUsize,
        status_calls: AtomicUsize,
        data_calls: AtomicUsize,
    }

    impl ScriptedApi {
        pub fn new(statuses: &[&str], data: Vec<Record>) -> Self {
            let api = Self {
                statuses: Mutex::new(VecDeque::new()),
                data: Mutex::new(VecDeque::new()),
                submit_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                data_calls: AtomicUsize::new(0),
            };
            api.then(statuses, data)
        }

        /// Queue the statuses and records of another submission.
        pub fn then(self, statuses: &[&str], data: Vec<Record>) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .extend(statuses.iter().map(|s| Ok(TaskStatus::from(*s))));
            self.data.lock().unwrap().push_back(Ok(data));
            self
        }

        /// Make the next status check fail at the transport level.
        pub fn with_status_error(self) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .push_front(Err("connection refused".to_string()));
            self
        }

        /// Make the most recently queued data fetch fail.
        pub fn with_data_error(self) -> Self {
            if let Some(last) = self.data.lock().unwrap().back_mut() {
                *last = Err("HTTP 500 Internal Server Error".to_string());
            }
            self
        }

        pub fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        pub fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        pub fn data_calls(&self) -> usize {
            self.data_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TaskApi for ScriptedApi {
        async fn submit(&self, _form: &SubmissionForm) -> Result<TaskHandle, PipelineError> {
            let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TaskHandle::new(n.to_string()))
        }

        async fn task_status(&self, task: &TaskHandle) -> Result<TaskStatus, PipelineError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.statuses.lock().unwrap().pop_front();
            match next {
                Some(Ok(status)) => Ok(status),
                Some(Err(message)) => Err(PipelineError::transport(format!("/api/tasks/{}", task), message)),
                None => Ok(TaskStatus::Pending),
            }
        }

        async fn task_data(&self, task: &TaskHandle) -> Result<Vec<Record>, PipelineError> {
            self.data_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.data.lock().unwrap().pop_front();
            match next {
                Some(Ok(records)) => Ok(records),
                Some(Err(message)) => Err(PipelineError::transport(format!("/api/tasks/{}/data", task), message)),
                None => Ok(Vec::new()),
            }
        }
    }
}

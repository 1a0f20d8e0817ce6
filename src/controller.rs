//! Session controller.
//!
//! Owns the fetched records and the genre selection for one session, runs
//! the submit, poll, and fetch sequence, and re-renders the chart whenever
//! the data or the selection changes.

use crate::analysis::{aggregate_by_year, distinct_genres, filter_records, DEFAULT_TOP_YEARS};
use crate::chart::Renderer;
use crate::client::{PollConfig, Poller, TaskApi};
use crate::error::PipelineError;
use crate::models::{FilterSelection, Record, SubmissionForm, Summary, TaskHandle};
use std::fmt;
use tracing::{debug, info, warn};

/// Where the session is in the submit, poll, render sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Form sent, waiting for the backend to hand out a task.
    Submitting,
    /// Waiting for the task to reach a terminal status.
    Polling(TaskHandle),
    /// Records cached and chart drawn.
    Ready,
    /// The last submission failed. A new submission starts over.
    Failed(String),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Submitting => write!(f, "submitting"),
            SessionState::Polling(task) => write!(f, "polling task {}", task),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Drives one chart session against a backend and a renderer.
pub struct Controller<A: TaskApi, R: Renderer> {
    api: A,
    renderer: R,
    poll_config: PollConfig,
    top_years: usize,
    records: Vec<Record>,
    selection: FilterSelection,
    genre_options: Vec<String>,
    state: SessionState,
}

impl<A: TaskApi, R: Renderer> Controller<A, R> {
    pub fn new(api: A, renderer: R, poll_config: PollConfig) -> Self {
        Self {
            api,
            renderer,
            poll_config,
            top_years: DEFAULT_TOP_YEARS,
            records: Vec::new(),
            selection: FilterSelection::All,
            genre_options: Vec::new(),
            state: SessionState::Idle,
        }
    }

    /// Number of most recent years kept in the summary.
    pub fn with_top_years(mut self, top_years: usize) -> Self {
        self.top_years = top_years.max(1);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Genre labels seen in the current records, in first-seen order.
    pub fn genre_options(&self) -> &[String] {
        &self.genre_options
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Submit `form`, wait for the task, load its records, and draw them.
    ///
    /// On success the record cache and genre options are replaced and the
    /// selection goes back to "all". On failure the state becomes `Failed`
    /// and the previous records are kept.
    pub async fn submit(&mut self, form: &SubmissionForm) -> Result<(), PipelineError> {
        match self.run_submission(form).await {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("Submission failed: {}", e);
                self.state = SessionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_submission(&mut self, form: &SubmissionForm) -> Result<(), PipelineError> {
        self.state = SessionState::Submitting;
        form.validate().map_err(PipelineError::InvalidForm)?;

        let task = self.api.submit(form).await?;
        info!("Submitted task {}", task);

        self.state = SessionState::Polling(task.clone());
        let records = Poller::new(&self.api, self.poll_config.clone())
            .await_completion(&task)
            .await?;

        self.load_records(records);
        self.render()
    }

    /// Replace the cached records and rebuild the genre options.
    fn load_records(&mut self, records: Vec<Record>) {
        self.genre_options = distinct_genres(&records);
        self.records = records;
        self.selection = FilterSelection::All;
        info!(
            "Loaded {} records with {} genres",
            self.records.len(),
            self.genre_options.len()
        );
    }

    /// Switch the genre filter and redraw from the cached records.
    pub fn change_filter(&mut self, selection: FilterSelection) -> Result<(), PipelineError> {
        if let FilterSelection::Genre(ref genre) = selection {
            if !self.genre_options.contains(genre) {
                debug!("Genre {:?} does not occur in the loaded records", genre);
            }
        }

        info!("Filtering by genre: {}", selection);
        self.selection = selection;
        self.render()
    }

    /// Summary for the current records and selection.
    pub fn current_summary(&self) -> Summary {
        let filtered = filter_records(&self.records, &self.selection);
        aggregate_by_year(filtered, self.top_years)
    }

    fn render(&mut self) -> Result<(), PipelineError> {
        let summary = self.current_summary();
        debug!("Rendering summary: {:?}", summary.pairs());
        self.renderer.render(&summary)?;
        Ok(())
    }
}

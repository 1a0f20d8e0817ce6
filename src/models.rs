//! Data models for the chart pipeline.
//!
//! This module contains the records fetched from the backend, the task
//! handle and status used while polling, the submission form, and the
//! derived summary that gets rendered.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One movie record returned by a completed task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Release date as sent by the backend (ISO-8601).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Genre labels. The backend stores these as a comma-separated string,
    /// so both that form and a JSON array are accepted.
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub genres: Vec<String>,
}

impl Record {
    /// Creates a record from a date and a list of genre labels.
    #[cfg(test)]
    pub fn new(release_date: &str, genres: &[&str]) -> Self {
        Self {
            release_date: Some(release_date.to_string()),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    /// Calendar year of the release date, if it parses.
    pub fn year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(parse_year)
    }

    /// Whether this record carries exactly the given genre label.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Extract the year from a date, naive date-time, or RFC 3339 string.
fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.year());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.year());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.year());
    }
    // Anything else must at least lead with a calendar date.
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawGenres {
        List(Vec<String>),
        Joined(String),
    }

    let genres = match Option::<RawGenres>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawGenres::List(list)) => list,
        Some(RawGenres::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect(),
    };

    Ok(genres)
}

/// Opaque identifier of a backend task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskHandle(s),
            RawId::Number(n) => TaskHandle(n.to_string()),
        })
    }
}

/// Status reported by the backend for a task.
///
/// The backend's set of states is open; anything that is neither
/// `completed` nor `failed` keeps the poller waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl TaskStatus {
    /// Returns true for statuses after which polling stops.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => TaskStatus::Pending,
            "in progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskStatus::from(raw.as_str()))
    }
}

/// Current genre filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSelection {
    #[default]
    All,
    Genre(String),
}

impl From<&str> for FilterSelection {
    fn from(s: &str) -> Self {
        if s == "all" {
            FilterSelection::All
        } else {
            FilterSelection::Genre(s.to_string())
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSelection::All => write!(f, "all"),
            FilterSelection::Genre(g) => write!(f, "{}", g),
        }
    }
}

/// Count of records released in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Year-bucketed counts, most recent year first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub buckets: Vec<YearCount>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Largest count in the summary (0 when empty).
    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Buckets as plain `(year, count)` pairs.
    pub fn pairs(&self) -> Vec<(i32, usize)> {
        self.buckets.iter().map(|b| (b.year, b.count)).collect()
    }
}

/// Parameters sent when starting a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionForm {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub min_rating: Option<f32>,
    pub language: Option<String>,
}

impl SubmissionForm {
    /// Check the form before it is sent.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(format!(
                    "start year {} cannot be after end year {}",
                    start, end
                ));
            }
        }

        if let Some(rating) = self.min_rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err("minimum rating must be between 0 and 10".to_string());
            }
        }

        Ok(())
    }

    /// Form-encoded fields. Every key is present; unset ones are empty.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn or_empty<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        vec![
            ("start_year", or_empty(&self.start_year)),
            ("end_year", or_empty(&self.end_year)),
            ("min_rating", or_empty(&self.min_rating)),
            ("language", or_empty(&self.language)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_year_formats() {
        assert_eq!(Record::new("2023-05-01", &[]).year(), Some(2023));
        assert_eq!(Record::new("2009-12-10T00:00:00", &[]).year(), Some(2009));
        assert_eq!(Record::new("2015-03-02T10:00:00+00:00", &[]).year(), Some(2015));
        assert_eq!(Record::new("1999-01-01 12:30:00", &[]).year(), Some(1999));
        assert_eq!(Record::new("not a date", &[]).year(), None);
        assert_eq!(Record::default().year(), None);
    }

    #[test]
    fn test_genres_from_array_string_and_null() {
        let json = r#"[
            {"release_date": "2020-01-01", "genres": ["Action", "Drama"]},
            {"release_date": "2020-01-01", "genres": "Action, Science Fiction"},
            {"release_date": "2020-01-01", "genres": null},
            {"release_date": "2020-01-01", "original_title": "Avatar"}
        ]"#;

        let records: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].genres, vec!["Action", "Drama"]);
        assert_eq!(records[1].genres, vec!["Action", "Science Fiction"]);
        assert!(records[2].genres.is_empty());
        assert!(records[3].genres.is_empty());
    }

    #[test]
    fn test_has_genre_is_case_sensitive() {
        let record = Record::new("2020-01-01", &["Action"]);
        assert!(record.has_genre("Action"));
        assert!(!record.has_genre("action"));
        assert!(!record.has_genre("Act"));
    }

    #[test]
    fn test_task_handle_from_string_or_number() {
        let a: TaskHandle = serde_json::from_str(r#""abc-1""#).unwrap();
        let b: TaskHandle = serde_json::from_str("42").unwrap();
        assert_eq!(a.to_string(), "abc-1");
        assert_eq!(b.to_string(), "42");
    }

    #[test]
    fn test_task_status_parsing() {
        assert_eq!(TaskStatus::from("completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::from("failed"), TaskStatus::Failed);
        assert_eq!(TaskStatus::from("in progress"), TaskStatus::InProgress);
        assert_eq!(
            TaskStatus::from("queued"),
            TaskStatus::Other("queued".to_string())
        );
        assert!(!TaskStatus::from("Completed").is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
    }

    #[test]
    fn test_filter_selection_from_str() {
        assert_eq!(FilterSelection::from("all"), FilterSelection::All);
        assert_eq!(
            FilterSelection::from("All"),
            FilterSelection::Genre("All".to_string())
        );
        assert_eq!(FilterSelection::from("Drama").to_string(), "Drama");
    }

    #[test]
    fn test_form_fields_keep_empty_keys() {
        let form = SubmissionForm {
            start_year: Some(2010),
            language: Some("en".to_string()),
            ..Default::default()
        };

        let fields = form.fields();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&("start_year", "2010".to_string())));
        assert!(fields.contains(&("end_year", String::new())));
        assert!(fields.contains(&("min_rating", String::new())));
        assert!(fields.contains(&("language", "en".to_string())));
    }

    #[test]
    fn test_form_validation() {
        let mut form = SubmissionForm {
            start_year: Some(2020),
            end_year: Some(2010),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        form.end_year = Some(2020);
        assert!(form.validate().is_ok());

        form.min_rating = Some(11.0);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_summary_helpers() {
        let summary = Summary {
            buckets: vec![
                YearCount { year: 2023, count: 2 },
                YearCount { year: 2021, count: 5 },
            ],
        };
        assert_eq!(summary.max_count(), 5);
        assert_eq!(summary.pairs(), vec![(2023, 2), (2021, 5)]);
        assert_eq!(Summary::default().max_count(), 0);
    }
}

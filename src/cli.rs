//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::chart::ChartFormat;
use crate::models::{FilterSelection, SubmissionForm};
use clap::Parser;
use std::path::PathBuf;

/// GenreChart - chart movie releases per year from a backend task
///
/// Submits the filter form to the backend, waits for the task to finish,
/// and draws how many movies were released in each of the most recent
/// years, optionally restricted to one genre.
///
/// Examples:
///   genrechart --start-year 2000 --end-year 2016
///   genrechart --language en --min-rating 7 --genre Action
///   genrechart --format svg --output chart.svg
///   genrechart --interactive
///   genrechart --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Backend base URL
    ///
    /// Can also be set via GENRECHART_SERVER env var or .genrechart.toml config.
    #[arg(long, value_name = "URL", env = "GENRECHART_SERVER")]
    pub server: Option<String>,

    /// Only include movies released in or after this year
    #[arg(long, value_name = "YEAR")]
    pub start_year: Option<i32>,

    /// Only include movies released in or before this year
    #[arg(long, value_name = "YEAR")]
    pub end_year: Option<i32>,

    /// Minimum average rating (0 - 10)
    #[arg(long, value_name = "RATING")]
    pub min_rating: Option<f32>,

    /// Original language code (e.g. en, fr)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Genre to chart once data is loaded ("all" for every genre)
    #[arg(short, long, value_name = "GENRE")]
    pub genre: Option<String>,

    /// Output format (text, svg, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ChartFormat>,

    /// Write the chart to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of most recent years to chart
    #[arg(long, value_name = "COUNT")]
    pub top_years: Option<usize>,

    /// Delay between task status checks, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Stop polling after this many status checks
    ///
    /// By default polling continues until the task completes or fails.
    #[arg(long, value_name = "COUNT")]
    pub max_attempts: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail when the result data cannot be fetched
    ///
    /// Without this flag a failed fetch after completion draws an empty chart.
    #[arg(long)]
    pub strict_data: bool,

    /// Read genre changes from stdin after the chart is drawn
    #[arg(short, long)]
    pub interactive: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .genrechart.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .genrechart.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref server) = self.server {
            if !server.starts_with("http://") && !server.starts_with("https://") {
                return Err("Server URL must start with 'http://' or 'https://'".to_string());
            }
        }

        self.form().validate()?;

        if self.top_years == Some(0) {
            return Err("Top years must be at least 1".to_string());
        }

        if self.max_attempts == Some(0) {
            return Err("Max attempts must be at least 1".to_string());
        }

        if self.poll_interval_ms == Some(0) {
            return Err("Poll interval must be at least 1 ms".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// The submission form described by the form flags.
    pub fn form(&self) -> SubmissionForm {
        SubmissionForm {
            start_year: self.start_year,
            end_year: self.end_year,
            min_rating: self.min_rating,
            language: self.language.clone(),
        }
    }

    /// The genre selection requested with --genre, if any.
    pub fn selection(&self) -> Option<FilterSelection> {
        self.genre.as_deref().map(FilterSelection::from)
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over both `--verbose` and `verbose = true` in the
    /// config file.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether to draw the progress spinner.
    pub fn show_progress(&self, stdout_is_terminal: bool) -> bool {
        !self.quiet && stdout_is_terminal
    }
}

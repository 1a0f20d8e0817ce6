//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.genrechart.toml` files.

use crate::analysis::DEFAULT_TOP_YEARS;
use crate::chart::{ChartFormat, ChartSize};
use crate::client::PollConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".genrechart.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Polling settings.
    #[serde(default)]
    pub poll: PollSettings,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Task polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    /// Delay between status checks in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum number of status checks. Unset means poll until the task
    /// reaches a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Show an empty chart instead of failing when the result fetch fails.
    #[serde(default = "default_true")]
    pub empty_on_data_error: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: None,
            empty_on_data_error: true,
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        PollConfig {
            interval: Duration::from_millis(settings.interval_ms),
            max_attempts: settings.max_attempts,
            empty_on_data_error: settings.empty_on_data_error,
        }
    }
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Output format.
    #[serde(default)]
    pub format: ChartFormat,

    /// Output file. Unset writes to stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Number of most recent years shown.
    #[serde(default = "default_top_years")]
    pub top_years: usize,

    /// SVG width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// SVG height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            format: ChartFormat::default(),
            output: None,
            top_years: default_top_years(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ChartConfig {
    pub fn size(&self) -> ChartSize {
        ChartSize {
            width: self.width,
            height: self.height,
        }
    }
}

fn default_top_years() -> usize {
    DEFAULT_TOP_YEARS
}

fn default_width() -> u32 {
    600
}

fn default_height() -> u32 {
    400
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only flags the user actually passed override file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref server) = args.server {
            self.server.base_url = server.clone();
        }
        if let Some(timeout) = args.timeout {
            self.server.timeout_seconds = timeout;
        }

        if let Some(interval) = args.poll_interval_ms {
            self.poll.interval_ms = interval;
        }
        if let Some(max) = args.max_attempts {
            self.poll.max_attempts = Some(max);
        }
        if args.strict_data {
            self.poll.empty_on_data_error = false;
        }

        if let Some(format) = args.format {
            self.chart.format = format;
        }
        if let Some(ref output) = args.output {
            self.chart.output = Some(output.clone());
        }
        if let Some(top_years) = args.top_years {
            self.chart.top_years = top_years;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), String> {
        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err("Server URL must start with 'http://' or 'https://'".to_string());
        }
        if self.server.timeout_seconds == 0 {
            return Err("Timeout must be at least 1 second".to_string());
        }
        if self.poll.interval_ms == 0 {
            return Err("Poll interval must be at least 1 ms".to_string());
        }
        if self.poll.max_attempts == Some(0) {
            return Err("Max attempts must be at least 1".to_string());
        }
        if self.chart.top_years == 0 {
            return Err("Top years must be at least 1".to_string());
        }
        if self.chart.format == ChartFormat::Svg && self.chart.output.is_none() {
            return Err("SVG output requires --output".to_string());
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.poll.interval_ms, 2000);
        assert_eq!(config.poll.max_attempts, None);
        assert!(config.poll.empty_on_data_error);
        assert_eq!(config.chart.top_years, 5);
        assert_eq!(config.chart.format, ChartFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
base_url = "https://movies.example.com"

[poll]
interval_ms = 500
max_attempts = 20
empty_on_data_error = false

[chart]
format = "svg"
output = "chart.svg"
top_years = 3
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.base_url, "https://movies.example.com");
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.poll.max_attempts, Some(20));
        assert!(!config.poll.empty_on_data_error);
        assert_eq!(config.chart.format, ChartFormat::Svg);
        assert_eq!(config.chart.output, Some(PathBuf::from("chart.svg")));
        assert_eq!(config.chart.top_years, 3);
        assert_eq!(config.chart.width, 600);

        let poll = PollConfig::from(&config.poll);
        assert_eq!(poll.interval, Duration::from_millis(500));
        assert_eq!(poll.max_attempts, Some(20));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.chart.format = ChartFormat::Svg;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.poll.max_attempts = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[poll]\ninterval_ms = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_general_verbose_drives_log_level() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = crate::cli::Args::try_parse_from(["genrechart"]).unwrap();

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let quiet = crate::cli::Args::try_parse_from(["genrechart", "--quiet"]).unwrap();
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[poll]"));
        assert!(toml_str.contains("[chart]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.poll.interval_ms, 2000);
    }
}

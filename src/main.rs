//! GenreChart - movie release charts from backend tasks
//!
//! A CLI tool that submits a filter form to the movie-data backend, polls
//! the resulting task until it finishes, and charts releases per year with
//! an optional genre filter.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, failed task, config, output, etc.)

mod analysis;
mod chart;
mod cli;
mod client;
mod config;
mod controller;
mod error;
mod models;

use anyhow::{Context, Result};
use chart::{ChartRenderer, RenderTarget, Renderer};
use cli::Args;
use client::{HttpTaskApi, PollConfig, TaskApi};
use config::{Config, CONFIG_FILE_NAME};
use controller::Controller;
use indicatif::{ProgressBar, ProgressStyle};
use models::{FilterSelection, SubmissionForm};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts so `[general] verbose` applies
    let (config, source) = match prepare_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(args.log_level(config.general.verbose));

    info!("GenreChart v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    info!("Using config from {}", source);

    match run(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .genrechart.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the server, polling, and chart output.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load the config file, apply CLI overrides, and validate the result.
fn prepare_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, source) = load_config(args)?;
    config.merge_with_args(args);
    config.validate().map_err(anyhow::Error::msg)?;
    Ok((config, source))
}

/// Run one submission, then apply filters.
async fn run(args: Args, config: Config) -> Result<()> {
    let api = HttpTaskApi::new(&config.server.base_url, config.server.timeout_seconds)?;
    let target = match config.chart.output {
        Some(ref path) => RenderTarget::File(path.clone()),
        None => RenderTarget::Stdout,
    };
    let renderer = ChartRenderer::new(config.chart.format, config.chart.size(), target);
    let poll_config = PollConfig::from(&config.poll);

    info!("Backend: {}", config.server.base_url);
    match poll_config.max_attempts {
        Some(max) => info!(
            "Polling every {:?}, at most {} checks",
            poll_config.interval, max
        ),
        None => info!("Polling every {:?}", poll_config.interval),
    }

    let mut controller =
        Controller::new(api, renderer, poll_config).with_top_years(config.chart.top_years);
    let form = args.form();
    let show_progress = args.show_progress(std::io::stdout().is_terminal());

    if let Err(e) = submit_with_progress(&mut controller, &form, show_progress).await {
        // Interactive sessions can resubmit; one-shot runs stop here.
        if !args.interactive {
            return Err(e.into());
        }
        eprintln!("❌ {}", e);
    } else if let Some(selection) = args.selection() {
        controller.change_filter(selection)?;
    }

    if args.interactive {
        run_interactive(&mut controller, &form, show_progress).await?;
    }

    if let Some(ref path) = config.chart.output {
        if !args.quiet {
            println!("✅ Chart saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Submit the form with a spinner showing while the task runs.
async fn submit_with_progress<A: TaskApi, R: Renderer>(
    controller: &mut Controller<A, R>,
    form: &SubmissionForm,
    show_progress: bool,
) -> Result<(), error::PipelineError> {
    let spinner = if !show_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Waiting for task to complete...");
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let result = controller.submit(form).await;
    spinner.finish_and_clear();

    if result.is_ok() {
        info!(
            "Loaded {} records; genres: {}",
            controller.records().len(),
            controller.genre_options().join(", ")
        );
    }
    result
}

/// Read genre changes and commands from stdin until EOF or `:quit`.
async fn run_interactive<A: TaskApi, R: Renderer>(
    controller: &mut Controller<A, R>,
    form: &SubmissionForm,
    show_progress: bool,
) -> Result<()> {
    eprintln!("Enter a genre, 'all', :genres, :resubmit or :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = line.trim();

        match input {
            "" => continue,
            ":quit" | ":q" => break,
            ":genres" => {
                if controller.genre_options().is_empty() {
                    eprintln!("(no genres loaded)");
                } else {
                    eprintln!("all, {}", controller.genre_options().join(", "));
                }
            }
            ":resubmit" => {
                if let Err(e) = submit_with_progress(controller, form, show_progress).await {
                    eprintln!("❌ {}", e);
                }
            }
            genre => {
                if let Err(e) = controller.change_filter(FilterSelection::from(genre)) {
                    warn!("Failed to redraw chart: {}", e);
                    eprintln!("❌ {}", e);
                }
            }
        }

        debug!(
            "Session state: {}, genre: {}",
            controller.state(),
            controller.selection()
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr and the
/// returned description of the source is logged by the caller.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, config_path.display().to_string()));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, CONFIG_FILE_NAME.to_string())),
        Ok(None) => Ok((Config::default(), "built-in defaults".to_string())),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok((Config::default(), "built-in defaults".to_string()))
        }
    }
}

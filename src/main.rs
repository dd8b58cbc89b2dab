use anyhow::{Context, Result};
use clap::Parser;
use job_hunter::app_log;
use job_hunter::cli::Cli;
use job_hunter::core::{ConfigManager, FsOps};
use job_hunter::preferences::{collect_preferences, load_preferences};
use job_hunter::{JobHunter, SearchPreferences};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            app_log!(error, "Run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();

    // Install the subscriber before loading service settings.
    let base_dir = ConfigManager::base_dir_from_env()?;
    let log_file = ConfigManager::log_file_for(&base_dir);
    if let Some(parent) = log_file.parent() {
        FsOps::ensure_dir_exists(parent).await?;
    }
    init_logging(&log_file)?;

    let mut config = ConfigManager::load_from(&base_dir);
    if let Some(mock_file) = cli.mock_file {
        config.paths.mock_file = mock_file;
    }
    config.ensure_directories().await?;

    app_log!(info, "Base directory: {}", config.paths.base_dir.display());
    app_log!(
        info,
        "Data source: {}",
        if config.service.api_key.is_some() {
            config.service.api_url.clone()
        } else {
            format!("mock file {}", config.paths.mock_file.display())
        }
    );

    let prefs = match &cli.config {
        Some(path) => load_preferences(path)?,
        None => prompt_preferences(&config.paths.default_preferences)?,
    };
    prefs.validate()?;

    let hunter = JobHunter::from_config(&config)?.with_launch(!cli.no_launch);
    hunter.run(&prefs).await?;
    Ok(())
}

/// Prompt on the terminal, using the default preferences file when present.
fn prompt_preferences(defaults_path: &Path) -> Result<SearchPreferences> {
    let defaults = if defaults_path.is_file() {
        match load_preferences(defaults_path) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                app_log!(warn, "Ignoring default preferences: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    collect_preferences(defaults.as_ref(), &mut stdin.lock(), &mut stdout.lock())
}

fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(filter)
        .init();
    Ok(())
}

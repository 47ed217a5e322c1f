//! snapsort - organize image collections by date, name, or size
//!
//! Thin CLI glue: argument parsing, logging setup, configuration loading,
//! and a styled summary of the run. All sorting logic lives in the library.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use snapsort::sorter::OutcomeStatus;
use snapsort::{CancelFlag, Cli, Config, EventChannel, Sorter};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli_output {
    //! Styled terminal output helpers for the run summary.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const HINT: Color = Color::DarkGrey;
    pub const ACCENT: Color = Color::Cyan;

    pub fn print_separator() {
        let _ = stdout().execute(Print(&format!("{}\n", "─".repeat(60))));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(Color::Yellow).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let source_styled = style(source).italic();
        let msg_styled = style(dest_or_msg).with(HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(source_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "snapsort starting");

    let config = load_config(&cli, &exe_dir)?;
    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    validate_config(&config)?;

    let sorter = Sorter::new(config.clone());
    let (events, _receiver) = EventChannel::new();
    let cancel = CancelFlag::new();

    match sorter.run(&events, &cancel) {
        Ok(outcomes) => {
            use cli_output::*;

            let sorted = outcomes
                .iter()
                .filter(|o| o.status != OutcomeStatus::Failed)
                .count();
            let failed = outcomes.len() - sorted;

            print_separator();
            print_blank();
            print_stat("Total", &outcomes.len().to_string(), ACCENT);
            print_stat("Sorted", &sorted.to_string(), SUCCESS);
            print_stat("Failed", &failed.to_string(), ERROR);
            print_blank();

            if cli.verbose {
                for outcome in &outcomes {
                    let dest = outcome
                        .destination
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    match outcome.status {
                        OutcomeStatus::Sorted => print_result(
                            "✓",
                            SUCCESS,
                            &outcome.source.display().to_string(),
                            &format!("→ {}", dest),
                        ),
                        OutcomeStatus::DryRun => print_result(
                            "~",
                            ACCENT,
                            &outcome.source.display().to_string(),
                            &format!("→ {}", dest),
                        ),
                        OutcomeStatus::Failed => print_result(
                            "✗",
                            ERROR,
                            &outcome.source.display().to_string(),
                            outcome.error.as_deref().unwrap_or("unknown error"),
                        ),
                    }
                }
                print_blank();
            }

            let failed_items: Vec<_> = outcomes
                .iter()
                .filter(|o| o.status == OutcomeStatus::Failed)
                .collect();
            if !failed_items.is_empty() {
                print_separator();
                print_error(&format!("{} file(s) failed", failed_items.len()));
                for outcome in &failed_items {
                    print_result(
                        "✗",
                        ERROR,
                        &outcome.source.display().to_string(),
                        outcome.error.as_deref().unwrap_or("unknown error"),
                    );
                }
            }

            if config.dry_run {
                print_separator();
                print_warning("Dry run - no files were copied or moved");
            }

            info!(log_file = %log_path.display(), "Processing complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        log_dir.join(format!("{}_{}.log", config_name, timestamp))
    } else {
        log_dir.join(format!("Run_{}.log", timestamp))
    }
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.source_dir.as_os_str().is_empty() {
        anyhow::bail!("No source directory given (use --source or a config file)");
    }
    if config.target_dir.as_os_str().is_empty() {
        anyhow::bail!("No target directory given (use --target or a config file)");
    }

    Ok(config)
}

/// Resolve config path - allows omitting the .toml extension
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };
    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());
    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }
    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Setup logging (non-blocking file appender + stderr)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(Some(guard))
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    if !config.source_dir.is_dir() {
        anyhow::bail!(
            "Source directory does not exist: {}",
            config.source_dir.display()
        );
    }

    if config.target_dir.starts_with(&config.source_dir) {
        anyhow::bail!(
            "Target directory {} is inside the source directory {}",
            config.target_dir.display(),
            config.source_dir.display()
        );
    }

    Ok(())
}

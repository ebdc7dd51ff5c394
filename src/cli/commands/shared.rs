//! Shared components for CLI commands
//!
//! This module contains logging setup, store opening, file discovery and
//! reporting helpers used across the command implementations.

use crate::app::services::dataset_store::DuckDbStore;
use crate::cli::args::DatabaseArgs;
use crate::config::Config;
use crate::constants::CSV_EXTENSION;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Outcome counts reported by a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReport {
    /// Number of files stored as datasets
    pub succeeded: usize,
    /// Number of files rejected
    pub failed: usize,
    /// Total number of records stored
    pub records: usize,
    /// Wall time of the command
    pub elapsed: Duration,
}

impl CommandReport {
    /// Whether every file was stored
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Set up structured logging
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agromet_ingest={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration: defaults, then environment, then command-line flags
pub fn load_config(database: &DatabaseArgs) -> Result<Config> {
    let mut config = Config::from_env();
    if let Some(target) = &database.database {
        config = config.with_database(target.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Open the DuckDB store named by the configuration, creating its schema
pub fn open_store(config: &Config) -> Result<DuckDbStore> {
    debug!("Opening database: {}", config.database);
    DuckDbStore::open(&config.database)
        .with_context(|| format!("Failed to open database '{}'", config.database))
}

/// Expand the given paths into the list of files to ingest.
///
/// Files are taken as given; directories are walked for `*.csv` files.
pub fn collect_csv_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = Vec::new();
            for entry in WalkDir::new(path) {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_file() && is_csv(entry.path()) {
                            found.push(entry.into_path());
                        }
                    }
                    Err(e) => {
                        warn!("Error walking directory {}: {}", path.display(), e);
                    }
                }
            }
            found.sort();
            debug!("Found {} CSV files in {}", found.len(), path.display());
            files.extend(found);
        } else {
            bail!("Path does not exist: {}", path.display());
        }
    }

    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// Create a progress bar, hidden when progress output is disabled
pub fn create_progress_bar(total: u64, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Print the end-of-run summary
pub fn print_summary(report: &CommandReport) {
    println!("\n{}", "Ingestion Summary".bright_green().bold());
    println!(
        "  {} {:.2}s",
        "Time elapsed:".bright_cyan(),
        report.elapsed.as_secs_f64()
    );
    println!(
        "  {} {}",
        "Files stored:".bright_cyan(),
        report.succeeded.to_string().bright_white()
    );
    if report.failed > 0 {
        println!(
            "  {} {}",
            "Files rejected:".bright_red(),
            report.failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Records stored:".bright_cyan(),
        report.records.to_string().bright_white().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_csv_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2023");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(nested.join("a.CSV"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_csv_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_csv(f)));
    }

    #[test]
    fn test_collect_csv_files_keeps_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readings.txt");
        fs::write(&file, "").unwrap();

        let files = collect_csv_files(&[file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_csv_files_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_csv_files(&[dir.path().join("absent")]).is_err());
    }

    #[test]
    fn test_load_config_flag_overrides() {
        let config = load_config(&DatabaseArgs {
            database: Some(":memory:".to_string()),
        })
        .unwrap();
        assert!(config.is_in_memory());
    }
}

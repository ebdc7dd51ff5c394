//! Command-line argument definitions for the agromet ingestion tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::models::Dialect;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the agromet sensor data ingester
///
/// Loads semicolon-delimited agrometeorological sensor CSV files into a
/// DuckDB database, one dataset per file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agromet",
    version,
    about = "Ingest agrometeorological sensor CSV files into DuckDB",
    long_about = "Validates semicolon-delimited sensor CSV files against the recognized column \
                  catalog and stores each file as one dataset. A file is stored completely or \
                  not at all: the first bad row rejects the whole upload."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings and hides progress bars.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest CSV files or directories of CSV files
    Ingest(IngestArgs),
    /// Create the database schema and seed reference data
    Init(DatabaseArgs),
    /// List stored datasets with their record counts
    Datasets(DatasetsArgs),
    /// Show the recognized columns of a dialect
    Columns(ColumnsArgs),
}

/// Database selection shared by every command that opens the store
#[derive(Debug, Clone, Parser)]
pub struct DatabaseArgs {
    /// Database file, or `:memory:`
    ///
    /// Defaults to $AGROMET_DATABASE, then to agromet.duckdb under the
    /// platform data directory.
    #[arg(
        long = "database",
        value_name = "TARGET",
        help = "Database file path or :memory:"
    )]
    pub database: Option<String>,
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Files or directories to ingest
    ///
    /// Directories are walked recursively for `*.csv` files. Each file becomes
    /// one dataset named after the file name.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// CSV layout of the files
    #[arg(
        short = 'd',
        long = "dialect",
        value_name = "DIALECT",
        default_value = "flexible",
        help = "CSV dialect: flexible (header-driven) or legacy (fixed positions)"
    )]
    pub dialect: Dialect,

    /// Field delimiter
    #[arg(
        long = "delimiter",
        value_name = "CHAR",
        help = "Field delimiter (default ';')"
    )]
    pub delimiter: Option<char>,

    /// Report format, one line per file in JSON mode
    #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Arguments for the datasets command
#[derive(Debug, Clone, Parser)]
pub struct DatasetsArgs {
    /// Listing format
    #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Output formats for reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Coloured, human-readable output
    Text,
    /// JSON output
    Json,
}

/// Arguments for the columns command
#[derive(Debug, Clone, Parser)]
pub struct ColumnsArgs {
    #[arg(
        short = 'd',
        long = "dialect",
        value_name = "DIALECT",
        default_value = "flexible",
        help = "CSV dialect: flexible or legacy"
    )]
    pub dialect: Dialect,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest() {
        let args = Args::try_parse_from([
            "agromet",
            "-vv",
            "ingest",
            "a.csv",
            "data/",
            "--dialect",
            "legacy",
            "--database",
            ":memory:",
        ])
        .unwrap();

        assert_eq!(args.get_log_level(), "debug");
        match args.command {
            Some(Commands::Ingest(ingest)) => {
                assert_eq!(ingest.paths.len(), 2);
                assert_eq!(ingest.dialect, Dialect::Legacy);
                assert_eq!(ingest.database.database.as_deref(), Some(":memory:"));
                assert_eq!(ingest.delimiter, None);
                assert_eq!(ingest.output, OutputFormat::Text);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ingest_requires_paths() {
        assert!(Args::try_parse_from(["agromet", "ingest"]).is_err());
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        assert!(Args::try_parse_from(["agromet", "columns", "--dialect", "fixed"]).is_err());
    }

    #[test]
    fn test_json_output_format() {
        let args = Args::try_parse_from(["agromet", "datasets", "--output", "json"]).unwrap();
        match args.command {
            Some(Commands::Datasets(datasets)) => {
                assert_eq!(datasets.output, OutputFormat::Json);
                assert_eq!(datasets.database.database, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Args::try_parse_from(["agromet", "ingest", "a.csv", "-o", "yaml"]).is_err());
    }

    #[test]
    fn test_quiet_mode() {
        let args = Args::try_parse_from(["agromet", "-q", "datasets"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }
}

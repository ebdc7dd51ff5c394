//! Command implementations for the agromet CLI
//!
//! Each command is implemented in its own module and returns a
//! [`CommandReport`] that `main` turns into an exit status.

pub mod columns;
pub mod datasets;
pub mod ingest;
pub mod init;
pub mod shared;

pub use shared::CommandReport;

use crate::cli::args::{Args, Commands};
use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Sets up logging, then dispatches to the subcommand handler:
/// - `ingest`: load CSV files as datasets
/// - `init`: create the schema and seed reference data
/// - `datasets`: list stored datasets
/// - `columns`: show a dialect's column catalog
pub async fn run(args: Args, cancellation: CancellationToken) -> Result<CommandReport> {
    shared::setup_logging(args.get_log_level(), args.quiet)?;
    let show_progress = args.show_progress();

    match args.command {
        Some(Commands::Ingest(ingest_args)) => {
            ingest::run_ingest(ingest_args, show_progress, cancellation).await
        }
        Some(Commands::Init(db_args)) => init::run_init(db_args, args.quiet).await,
        Some(Commands::Datasets(datasets_args)) => datasets::run_datasets(datasets_args).await,
        Some(Commands::Columns(columns_args)) => columns::run_columns(columns_args).await,
        None => bail!("No command given"),
    }
}

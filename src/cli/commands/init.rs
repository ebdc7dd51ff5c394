//! Init command: create the schema and seed reference data

use super::shared::{CommandReport, load_config, open_store};
use crate::app::services::reference_data::seed_reference_data;
use crate::cli::args::DatabaseArgs;
use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;
use tracing::info;

pub async fn run_init(args: DatabaseArgs, quiet: bool) -> Result<CommandReport> {
    let start_time = Instant::now();
    let config = load_config(&args)?;
    let store = open_store(&config)?;
    info!("Schema ready in {}", config.database);

    let stats = seed_reference_data(&store).context("Failed to seed reference data")?;

    if !quiet {
        println!(
            "{} {} ({} units, {} operators added)",
            "Initialized".bright_green().bold(),
            config.database.bright_white(),
            stats.units_inserted,
            stats.operators_inserted
        );
    }

    Ok(CommandReport {
        elapsed: start_time.elapsed(),
        ..CommandReport::default()
    })
}

//! Datasets command: list stored datasets

use super::shared::{CommandReport, load_config, open_store};
use crate::app::services::dataset_store::DatasetBrowser;
use crate::cli::args::{DatasetsArgs, OutputFormat};
use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;

pub async fn run_datasets(args: DatasetsArgs) -> Result<CommandReport> {
    let start_time = Instant::now();
    let config = load_config(&args.database)?;
    let store = open_store(&config)?;

    let summaries = store.list_datasets().context("Failed to list datasets")?;
    if args.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No datasets stored in {}", config.database);
    } else {
        println!(
            "{:<40} {:>10}  {}",
            "Dataset".bright_cyan(),
            "Records".bright_cyan(),
            "Id".bright_cyan()
        );
        for summary in &summaries {
            println!(
                "{:<40} {:>10}  {}",
                summary.dataset.name, summary.record_count, summary.dataset.id
            );
        }
    }

    Ok(CommandReport {
        succeeded: summaries.len(),
        records: summaries.iter().map(|s| s.record_count).sum(),
        elapsed: start_time.elapsed(),
        ..CommandReport::default()
    })
}

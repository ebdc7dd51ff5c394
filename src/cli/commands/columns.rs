//! Columns command: print the recognized catalog of a dialect

use super::shared::CommandReport;
use crate::app::models::Dialect;
use crate::app::services::csv_ingest::ColumnCatalog;
use crate::cli::args::ColumnsArgs;
use anyhow::Result;
use colored::*;

pub async fn run_columns(args: ColumnsArgs) -> Result<CommandReport> {
    let catalog = ColumnCatalog::for_dialect(args.dialect);

    println!(
        "{} ({} columns)",
        format!("{} dialect", catalog.dialect()).bright_green().bold(),
        catalog.len()
    );
    for name in catalog.names() {
        // Position is significant only for the legacy layout
        match (catalog.dialect(), catalog.position(name)) {
            (Dialect::Legacy, Some(index)) => println!("  {:>2}  {}", index + 1, name),
            _ => println!("  {}", name),
        }
    }

    Ok(CommandReport::default())
}

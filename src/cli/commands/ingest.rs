//! Ingest command implementation
//!
//! Each file is ingested as its own dataset on the blocking thread pool, one
//! at a time. A rejected file does not stop the run; cancellation does.

use super::shared::{
    CommandReport, collect_csv_files, create_progress_bar, load_config, open_store, print_summary,
};
use crate::ErrorKind;
use crate::app::services::csv_ingest::{IngestOutcome, IngestionPipeline};
use crate::app::services::dataset_store::DatasetStore;
use crate::cli::args::{IngestArgs, OutputFormat};
use anyhow::{Context, Result, bail};
use colored::*;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Ingest command runner
pub async fn run_ingest(
    args: IngestArgs,
    show_progress: bool,
    cancellation: CancellationToken,
) -> Result<CommandReport> {
    let start_time = Instant::now();
    debug!("Ingest arguments: {:?}", args);

    let mut config = load_config(&args.database)?.with_dialect(args.dialect);
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("Delimiter must be an ASCII character, got '{}'", delimiter);
        }
        config = config.with_delimiter(delimiter as u8);
        config.validate().context("Invalid delimiter")?;
    }

    let files = collect_csv_files(&args.paths)?;
    if files.is_empty() {
        bail!("No CSV files found in the given paths");
    }
    info!(
        "Ingesting {} files into {} ({} dialect)",
        files.len(),
        config.database,
        config.dialect
    );

    let store: Arc<dyn DatasetStore> = Arc::new(open_store(&config)?);
    let pipeline =
        Arc::new(IngestionPipeline::new(store, config).with_cancellation(cancellation.clone()));

    let json_mode = args.output == OutputFormat::Json;
    let show_progress = show_progress && !json_mode;
    let progress = create_progress_bar(files.len() as u64, show_progress)?;
    let mut report = CommandReport::default();

    for path in files {
        if cancellation.is_cancelled() {
            warn!("Ingestion cancelled, skipping remaining files");
            break;
        }

        progress.set_message(path.display().to_string());

        let task_pipeline = Arc::clone(&pipeline);
        let task_path = path.clone();
        let result = tokio::task::spawn_blocking(move || task_pipeline.ingest_file(&task_path))
            .await
            .context("Ingestion task failed")?;

        if json_mode {
            println!("{}", file_report(&path, &result));
        }

        match result {
            Ok(outcome) => {
                report.succeeded += 1;
                report.records += outcome.records_inserted;
                if !json_mode {
                    progress.println(format!(
                        "{} {} ({} records)",
                        "✓".bright_green(),
                        outcome.dataset.name,
                        outcome.records_inserted
                    ));
                }
            }
            Err(error) => {
                report.failed += 1;
                if !json_mode {
                    progress.println(format!(
                        "{} {} [{}]: {}",
                        "✗".bright_red(),
                        path.display(),
                        error.kind(),
                        error
                    ));
                }
                if error.kind() == ErrorKind::Cancelled {
                    break;
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    report.elapsed = start_time.elapsed();

    if show_progress {
        print_summary(&report);
    }

    Ok(report)
}

/// One JSON object describing the result for a file
fn file_report(path: &Path, result: &crate::Result<IngestOutcome>) -> serde_json::Value {
    match result {
        Ok(outcome) => json!({
            "file": path.display().to_string(),
            "status": "ok",
            "message": outcome.message(),
            "outcome": outcome,
        }),
        Err(error) => json!({
            "file": path.display().to_string(),
            "status": "error",
            "kind": error.kind(),
            "error": error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Dialect;
    use crate::cli::args::DatabaseArgs;
    use std::fs;

    fn args(paths: Vec<std::path::PathBuf>, database: &std::path::Path) -> IngestArgs {
        IngestArgs {
            paths,
            dialect: Dialect::Flexible,
            delimiter: None,
            output: OutputFormat::Text,
            database: DatabaseArgs {
                database: Some(database.to_string_lossy().into_owned()),
            },
        }
    }

    #[tokio::test]
    async fn test_run_ingest_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(
            data.join("good.csv"),
            "date;time;precipitation\n2023-05-01;12:00:00;0,4\n2023-05-01;13:00:00;1\n",
        )
        .unwrap();
        fs::write(data.join("bad.csv"), "date;time\n2023-05-01;12:00:00\n").unwrap();

        let report = run_ingest(
            args(vec![data], &dir.path().join("test.duckdb")),
            false,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.records, 2);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_run_ingest_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readings.csv");
        fs::write(&file, "date;time;precipitation\n2023-05-01;12:00:00;1\n").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let report = run_ingest(args(vec![file], &dir.path().join("test.duckdb")), false, token)
            .await
            .unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_file_report_json() {
        let outcome = IngestOutcome {
            dataset: crate::Dataset::new("station.csv"),
            dialect: Dialect::Legacy,
            rows_read: 3,
            records_inserted: 3,
            elapsed: std::time::Duration::from_millis(5),
        };
        let ok = file_report(Path::new("data/station.csv"), &Ok(outcome));
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["message"], "Successfully uploaded file.");
        assert_eq!(ok["outcome"]["dataset"]["name"], "station.csv");
        assert_eq!(ok["outcome"]["dialect"], "legacy");
        assert_eq!(ok["outcome"]["records_inserted"], 3);

        let failed = file_report(
            Path::new("data/station.csv"),
            &Err(crate::IngestError::duplicate_name("station.csv")),
        );
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["kind"], "DuplicateName");
        assert!(failed["error"].as_str().unwrap().contains("station.csv"));
    }

    #[tokio::test]
    async fn test_run_ingest_rejects_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_ingest(
            args(vec![dir.path().to_path_buf()], &dir.path().join("test.duckdb")),
            false,
            CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
    }
}

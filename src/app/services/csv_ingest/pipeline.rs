//! Ingestion pipeline orchestration
//!
//! One upload moves through
//! `Start -> HeaderRead -> ColumnsResolved -> RowsAccumulating -> BatchPersisted`.
//! The dataset is created just before rows are accumulated; any failure after
//! that point deletes it again before the error is returned, so an upload is
//! either fully stored or leaves nothing behind.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use csv::ReaderBuilder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::column_mapping::resolver_for;
use super::input::decode_upload;
use super::record_parser::RowParser;
use super::stats::IngestOutcome;
use crate::app::models::Dataset;
use crate::app::services::dataset_store::{DatasetStore, StoreError};
use crate::config::Config;
use crate::{IngestError, Result};

/// Position of an upload in the ingestion state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    HeaderRead,
    ColumnsResolved,
    RowsAccumulating,
    BatchPersisted,
    RolledBack,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "start",
            PipelineStage::HeaderRead => "header read",
            PipelineStage::ColumnsResolved => "columns resolved",
            PipelineStage::RowsAccumulating => "rows accumulating",
            PipelineStage::BatchPersisted => "batch persisted",
            PipelineStage::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}

/// Speculatively created dataset that is deleted unless committed.
///
/// Dropping the guard without calling [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) deletes the dataset as well, which covers
/// panics and abandoned uploads.
pub struct PendingDataset<'a> {
    store: &'a dyn DatasetStore,
    dataset: Dataset,
    settled: bool,
}

impl<'a> PendingDataset<'a> {
    pub fn new(store: &'a dyn DatasetStore, dataset: Dataset) -> Self {
        Self {
            store,
            dataset,
            settled: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.dataset.id
    }

    /// Keep the dataset
    pub fn commit(mut self) -> Dataset {
        self.settled = true;
        self.dataset.clone()
    }

    /// Delete the dataset and hand back the error that caused it.
    ///
    /// A failed deletion is logged; the original error is still the one returned.
    pub fn rollback(mut self, stage: PipelineStage, cause: IngestError) -> IngestError {
        self.settled = true;
        warn!(
            "Rolling back dataset '{}' during {}: {}",
            self.dataset.name, stage, cause
        );
        self.discard();
        cause
    }

    fn discard(&self) {
        match self.store.delete_dataset(self.dataset.id) {
            Ok(()) => debug!(
                "Dataset '{}' ({}) {}",
                self.dataset.name,
                self.dataset.id,
                PipelineStage::RolledBack
            ),
            Err(e) => error!(
                "Failed to delete dataset '{}' ({}) during rollback: {}",
                self.dataset.name, self.dataset.id, e
            ),
        }
    }
}

impl Drop for PendingDataset<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                "Upload of '{}' abandoned before commit, discarding dataset",
                self.dataset.name
            );
            self.discard();
        }
    }
}

/// Turns uploaded CSV files into stored datasets
pub struct IngestionPipeline {
    store: Arc<dyn DatasetStore>,
    config: Config,
    cancellation: Option<CancellationToken>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn DatasetStore>, config: Config) -> Self {
        Self {
            store,
            config,
            cancellation: None,
        }
    }

    /// Abort uploads in progress when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingest a file from disk, naming the dataset after the file name
    pub fn ingest_file(&self, path: &Path) -> Result<IngestOutcome> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                IngestError::parse_failure(format!("Not a file path: {}", path.display()))
            })?;

        let file = File::open(path).map_err(|e| {
            IngestError::parse_failure(format!("Failed to open {}: {}", path.display(), e))
        })?;

        self.ingest(&name, file)
    }

    /// Ingest one upload as the dataset `filename`
    pub fn ingest<R: Read>(&self, filename: &str, upload: R) -> Result<IngestOutcome> {
        let started = Instant::now();
        let dialect = self.config.dialect;
        info!("Ingesting '{}' ({} dialect)", filename, dialect);

        if self.store.find_dataset_by_name(filename)?.is_some() {
            return Err(IngestError::duplicate_name(filename));
        }

        let content = decode_upload(upload)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut rows = reader.records();

        let header = match rows.next() {
            Some(header) => header?,
            None => return Err(IngestError::schema_violation("file is empty")),
        };
        debug!("'{}': {} ({} fields)", filename, PipelineStage::HeaderRead, header.len());

        let resolver = resolver_for(dialect);
        let column_map = resolver.resolve_header(&header)?;
        let (recognized, ignored) = column_map.stats();
        debug!(
            "'{}': {} ({} recognized, {} ignored)",
            filename,
            PipelineStage::ColumnsResolved,
            recognized,
            ignored
        );

        if self.is_cancelled() {
            return Err(IngestError::cancelled(filename));
        }

        let dataset = self
            .store
            .create_dataset(filename)
            .map_err(|e| match e {
                StoreError::DuplicateName(_) => IngestError::duplicate_name(filename),
                other => IngestError::from(other),
            })?;
        debug!("Created dataset '{}' ({})", dataset.name, dataset.id);

        let pending = PendingDataset::new(self.store.as_ref(), dataset);
        let parser = RowParser::new(dialect, self.config.delimiter);
        let stage = PipelineStage::RowsAccumulating;

        let mut records = Vec::new();
        let mut rows_read = 0;
        for row in rows {
            if self.is_cancelled() {
                return Err(pending.rollback(stage, IngestError::cancelled(filename)));
            }

            let row = match row {
                Ok(row) => row,
                Err(e) => return Err(pending.rollback(stage, e.into())),
            };
            rows_read += 1;

            let parsed = resolver
                .check_row(&row, &column_map)
                .map_err(|e| e.with_row(parser.row_context(&row)))
                .and_then(|()| parser.parse(&row, &column_map, pending.id()));

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => return Err(pending.rollback(stage, e)),
            }
        }

        if records.is_empty() {
            return Err(pending.rollback(stage, IngestError::schema_violation("no data rows")));
        }

        let records_inserted = match self.store.bulk_insert_records(&records) {
            Ok(count) => count,
            Err(e) => return Err(pending.rollback(stage, IngestError::from(e))),
        };

        let dataset = pending.commit();
        let elapsed = started.elapsed();
        info!(
            "'{}': {} ({} records in {:.2}s)",
            dataset.name,
            PipelineStage::BatchPersisted,
            records_inserted,
            elapsed.as_secs_f64()
        );

        Ok(IngestOutcome {
            dataset,
            dialect,
            rows_read,
            records_inserted,
            elapsed,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

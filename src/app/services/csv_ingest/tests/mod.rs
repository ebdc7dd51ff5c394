//! Test utilities and store doubles for CSV ingestion testing
//!
//! This module provides common fixtures, a fault-injecting store wrapper, and
//! helper functions used across the ingestion test modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use csv::{ReaderBuilder, StringRecord};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::app::models::{Dataset, Dialect, Record};
use crate::app::services::dataset_store::{
    DatasetBrowser, DatasetStore, MemoryStore, StoreError, StoreResult,
};
use crate::config::Config;

use super::IngestionPipeline;

// Test modules
mod column_mapping_tests;

/// Memory store that can be told to fail individual operations
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_bulk_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Report a uniqueness conflict on create even though the pre-check passed
    pub conflict_on_create: AtomicBool,
    /// Cancelled as soon as a dataset has been created
    pub cancel_on_create: Option<CancellationToken>,
    pub delete_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_bulk_insert() -> Self {
        let store = Self::new();
        store.fail_bulk_insert.store(true, Ordering::SeqCst);
        store
    }

    pub fn cancelling_on_create(token: CancellationToken) -> Self {
        Self {
            cancel_on_create: Some(token),
            ..Self::default()
        }
    }

    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

impl DatasetStore for FaultyStore {
    fn find_dataset_by_name(&self, name: &str) -> StoreResult<Option<Dataset>> {
        self.inner.find_dataset_by_name(name)
    }

    fn create_dataset(&self, name: &str) -> StoreResult<Dataset> {
        if self.conflict_on_create.load(Ordering::SeqCst) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        let dataset = self.inner.create_dataset(name)?;
        if let Some(token) = &self.cancel_on_create {
            token.cancel();
        }
        Ok(dataset)
    }

    fn delete_dataset(&self, id: Uuid) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::ExecutionError("delete refused".to_string()));
        }
        self.inner.delete_dataset(id)
    }

    fn bulk_insert_records(&self, records: &[Record]) -> StoreResult<usize> {
        if self.fail_bulk_insert.load(Ordering::SeqCst) {
            return Err(StoreError::ExecutionError("disk full".to_string()));
        }
        self.inner.bulk_insert_records(records)
    }
}

/// Pipeline over a fresh memory store, returning both
pub fn memory_pipeline(dialect: Dialect) -> (Arc<MemoryStore>, IngestionPipeline) {
    let store = Arc::new(MemoryStore::new());
    let pipeline = IngestionPipeline::new(store.clone(), test_config(dialect));
    (store, pipeline)
}

/// Configuration that never touches the filesystem
pub fn test_config(dialect: Dialect) -> Config {
    Config::default()
        .with_dialect(dialect)
        .with_database(":memory:")
}

/// Split semicolon-delimited text into rows with line positions
pub fn rows(content: &str) -> Vec<StringRecord> {
    ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// A single row parsed from one line
pub fn row(line: &str) -> StringRecord {
    rows(line).remove(0)
}

/// Names of all stored datasets
pub fn dataset_names(store: &MemoryStore) -> Vec<String> {
    store
        .list_datasets()
        .unwrap()
        .into_iter()
        .map(|summary| summary.dataset.name)
        .collect()
}

/// Fourteen-field legacy row
pub const LEGACY_ROW: &str =
    "2023-05-01;12:00:00;PT184;PT18;21,5;65;0;3,2;270;7,5;1013,2;70;20,1;512,4";

/// Legacy file with a skipped header and two rows
pub fn legacy_file() -> String {
    format!(
        "Date;Hour;NUTS3;NUTS2;T;RH;P;WS;WD;WG;AP;RHc;Tc;SI\n{}\n{}\n",
        LEGACY_ROW,
        "2023-05-01;13:00:00;PT184;PT18;22;60;;3;180;8;1012;68;21;600"
    )
}

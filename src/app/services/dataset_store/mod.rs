//! Dataset persistence for ingested uploads
//!
//! The ingestion pipeline only talks to storage through the [`DatasetStore`]
//! trait: a name lookup, a create, a delete and one bulk insert per upload.
//! Two implementations are provided:
//! - [`MemoryStore`] - mutex-guarded in-process store, used by tests and dry runs
//! - [`DuckDbStore`] - DuckDB file or in-memory database
//!
//! Name uniqueness is enforced by every implementation at create time, so a
//! pre-check that races with a concurrent upload still ends in a rejected
//! create rather than two datasets with one name.

pub mod duckdb_store;
pub mod error;
pub mod memory;

pub use duckdb_store::DuckDbStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use crate::app::models::{Dataset, Record};
use serde::Serialize;
use uuid::Uuid;

/// Storage collaborator used by the ingestion pipeline
///
/// Implementations must be Send + Sync so one store can serve several uploads.
pub trait DatasetStore: Send + Sync {
    /// Look up a dataset by its unique name
    fn find_dataset_by_name(&self, name: &str) -> StoreResult<Option<Dataset>>;

    /// Create a dataset, assigning its identifier.
    ///
    /// Returns [`StoreError::DuplicateName`] when the name is taken.
    fn create_dataset(&self, name: &str) -> StoreResult<Dataset>;

    /// Delete a dataset together with all of its records
    fn delete_dataset(&self, id: Uuid) -> StoreResult<()>;

    /// Insert all records as one unit; returns the number of rows written
    fn bulk_insert_records(&self, records: &[Record]) -> StoreResult<usize>;
}

/// Dataset with the number of records stored for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub dataset: Dataset,
    pub record_count: usize,
}

/// Read access used by reporting commands and tests
pub trait DatasetBrowser: Send + Sync {
    /// All datasets ordered by name
    fn list_datasets(&self) -> StoreResult<Vec<DatasetSummary>>;

    /// Records of one dataset in insertion order
    fn records_for_dataset(&self, id: Uuid) -> StoreResult<Vec<Record>>;
}

/// Reference tables seeded once at startup
pub trait ReferenceDataStore: Send + Sync {
    /// Insert a measurement unit; returns false if it already existed
    fn insert_unit(&self, name: &str, symbol: &str) -> StoreResult<bool>;

    /// Insert a comparison operator; returns false if it already existed
    fn insert_operator(&self, symbol: &str) -> StoreResult<bool>;

    /// Units currently stored as (name, symbol), ordered by name
    fn units(&self) -> StoreResult<Vec<(String, String)>>;

    /// Operators currently stored, ordered by symbol
    fn operators(&self) -> StoreResult<Vec<String>>;
}

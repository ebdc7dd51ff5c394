//! Schema-tolerant ingestion of semicolon-delimited sensor CSV files
//!
//! This module turns one uploaded file into a stored dataset, or into nothing
//! at all when any part of the file is rejected.
//!
//! ## Architecture
//!
//! The pipeline is organized into logical components:
//! - [`catalog`] - Recognized column names per dialect
//! - [`column_mapping`] - Header resolution strategies (flexible and legacy)
//! - [`record_parser`] - Raw row to validated record
//! - [`field_parsers`] - Cell lookup and coercion helpers
//! - [`input`] - Upload decoding (BOM, UTF-8)
//! - [`pipeline`] - State machine, rollback and bulk persistence
//! - [`stats`] - Outcome of a committed upload
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use agromet_ingest::Config;
//! use agromet_ingest::app::services::csv_ingest::IngestionPipeline;
//! use agromet_ingest::app::services::dataset_store::MemoryStore;
//!
//! # fn example() -> agromet_ingest::Result<()> {
//! let pipeline = IngestionPipeline::new(Arc::new(MemoryStore::new()), Config::default());
//! let upload = "date;time;atmospheric_temperature\n2023-05-01;12:00:00;21,5\n";
//! let outcome = pipeline.ingest("station.csv", upload.as_bytes())?;
//!
//! println!("{} ({} records)", outcome.message(), outcome.records_inserted);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod column_mapping;
pub mod field_parsers;
pub mod input;
pub mod pipeline;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use catalog::ColumnCatalog;
pub use column_mapping::{
    ColumnMap, ColumnResolver, FlexibleResolver, LegacyResolver, resolver_for,
};
pub use pipeline::{IngestionPipeline, PendingDataset, PipelineStage};
pub use record_parser::RowParser;
pub use stats::IngestOutcome;

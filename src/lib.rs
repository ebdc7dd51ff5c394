//! Agromet Ingest Library
//!
//! A Rust library for loading semicolon-delimited agrometeorological sensor
//! CSV files into a dataset store.
//!
//! This library provides tools for:
//! - Resolving file headers against a catalog of recognized sensor columns
//! - Parsing rows with locale-aware numeric coercion and range validation
//! - Storing each file as one dataset, all-or-nothing, with rollback on failure
//! - Persisting datasets in DuckDB or in memory
//! - Seeding the unit and operator reference tables

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod csv_ingest;
        pub mod dataset_store;
        pub mod reference_data;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Dataset, Dialect, Record};
pub use app::services::csv_ingest::{IngestOutcome, IngestionPipeline};
pub use config::Config;
pub use error::{ErrorKind, IngestError, Result, RowContext};

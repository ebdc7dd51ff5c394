//! Error types for dataset storage

use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Opening the database failed
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// A statement failed to execute
    #[error("SQL execution failed: {0}")]
    ExecutionError(String),

    /// The unique constraint on dataset names rejected a create
    #[error("Dataset name already exists: {0}")]
    DuplicateName(String),

    /// A stored value could not be read back into its model type
    #[error("Stored value could not be decoded: {0}")]
    Decode(String),

    /// Mutex guarding the connection was poisoned
    #[error("Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Transaction control failed
    #[error("Transaction failed: {0}")]
    TransactionError(String),

    /// Anything else
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl From<duckdb::Error> for StoreError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured constraint variant, so the
        // classification goes by message text.
        let msg = err.to_string();
        if msg.contains("Duplicate key") || msg.contains("unique constraint") {
            StoreError::DuplicateName(msg)
        } else {
            StoreError::ExecutionError(msg)
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StoreError::MutexPoisoned(err.to_string())
    }
}

//! Configuration management and validation.
//!
//! Provides the settings an ingestion run needs: which CSV dialect to expect,
//! the field delimiter, and where the dataset database lives.

use crate::app::models::Dialect;
use crate::constants::{
    APP_DATA_DIR, DATABASE_ENV_VAR, DEFAULT_DATABASE_FILE, DEFAULT_DELIMITER, IN_MEMORY_DATABASE,
    LOCALE_DECIMAL_SEPARATOR,
};
use std::path::PathBuf;
use tracing::debug;

/// Configuration errors
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Delimiter must be a single printable ASCII character, got byte 0x{0:02x}")]
    InvalidDelimiter(u8),

    #[error("Delimiter '{0}' conflicts with decimal or quote characters")]
    ConflictingDelimiter(char),

    #[error("Database target must not be empty")]
    EmptyDatabase,
}

/// Settings for an ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// CSV layout expected in uploads
    pub dialect: Dialect,

    /// Field delimiter byte
    pub delimiter: u8,

    /// Database file path, or `:memory:`
    pub database: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            delimiter: DEFAULT_DELIMITER,
            database: default_database_path().to_string_lossy().into_owned(),
        }
    }
}

impl Config {
    /// Default configuration with the database target taken from the environment
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(DATABASE_ENV_VAR) {
            Ok(target) if !target.trim().is_empty() => {
                debug!("Using database target from {}: {}", DATABASE_ENV_VAR, target);
                config.with_database(target)
            }
            _ => config,
        }
    }

    /// Set the expected dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the database target
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Whether the database target is a throwaway in-memory store
    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY_DATABASE
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii_graphic() && self.delimiter != b'\t' {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }

        let delimiter = char::from(self.delimiter);
        if matches!(delimiter, '.' | '"') || delimiter == LOCALE_DECIMAL_SEPARATOR {
            return Err(ConfigError::ConflictingDelimiter(delimiter));
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::EmptyDatabase);
        }

        Ok(())
    }
}

/// Default database file under the platform data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DATA_DIR)
        .join(DEFAULT_DATABASE_FILE)
}

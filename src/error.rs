//! Error handling for ingestion operations.
//!
//! Every failure surfaced by the pipeline is an [`IngestError`]. Callers that
//! need to branch on the failure class use [`IngestError::kind`] rather than
//! matching on message text.

use crate::app::services::dataset_store::StoreError;
use serde::Serialize;
use std::fmt;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Discriminant of an [`IngestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    DuplicateName,
    SchemaViolation,
    ParseFailure,
    RangeViolation,
    PersistenceFailure,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DuplicateName => "DuplicateName",
            ErrorKind::SchemaViolation => "SchemaViolation",
            ErrorKind::ParseFailure => "ParseFailure",
            ErrorKind::RangeViolation => "RangeViolation",
            ErrorKind::PersistenceFailure => "PersistenceFailure",
            ErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// Raw content of the data row that triggered a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    /// 1-based line number in the uploaded file
    pub line: u64,
    /// Fields of the row re-joined with the upload delimiter
    pub content: String,
}

impl RowContext {
    pub fn new(line: u64, content: impl Into<String>) -> Self {
        Self {
            line,
            content: content.into(),
        }
    }
}

impl fmt::Display for RowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, row in question ({})", self.line, self.content)
    }
}

fn describe_row(row: &Option<RowContext>) -> String {
    match row {
        Some(row) => format!(" at {}", row),
        None => String::new(),
    }
}

/// Ingestion failure with a kind and a human-readable detail
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    /// A dataset with the same name already exists
    #[error("Dataset '{name}' already uploaded, please rename your dataset")]
    DuplicateName { name: String },

    /// Header or file structure does not satisfy the column catalog rules
    #[error("Schema violation: {reason}")]
    SchemaViolation { reason: String },

    /// A cell could not be coerced, or a row is structurally short
    #[error("Error when parsing row: {reason}{}", describe_row(.row))]
    ParseFailure {
        reason: String,
        row: Option<RowContext>,
    },

    /// A value parsed but lies outside its domain
    #[error(
        "Value {value} for '{field}' is out of range (expected {min} to {max}){}",
        describe_row(.row)
    )]
    RangeViolation {
        field: String,
        value: f64,
        min: f64,
        max: f64,
        row: Option<RowContext>,
    },

    /// The storage collaborator reported an error
    #[error("Unable to store dataset: {message}")]
    PersistenceFailure {
        message: String,
        #[source]
        source: StoreError,
    },

    /// The upload was abandoned before its records were committed
    #[error("Upload of '{name}' was cancelled")]
    Cancelled { name: String },
}

impl IngestError {
    /// Create a duplicate dataset name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a schema violation error
    pub fn schema_violation(reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            reason: reason.into(),
        }
    }

    /// Create a parse failure without row context
    pub fn parse_failure(reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
            row: None,
        }
    }

    /// Create a range violation without row context
    pub fn range_violation(
        field: impl Into<String>,
        value: f64,
        range: &std::ops::RangeInclusive<f64>,
    ) -> Self {
        Self::RangeViolation {
            field: field.into(),
            value,
            min: *range.start(),
            max: *range.end(),
            row: None,
        }
    }

    /// Create a persistence failure
    pub fn persistence(message: impl Into<String>, source: StoreError) -> Self {
        Self::PersistenceFailure {
            message: message.into(),
            source,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(name: impl Into<String>) -> Self {
        Self::Cancelled { name: name.into() }
    }

    /// Attach the offending row to a row-level failure; other kinds pass through
    pub fn with_row(self, context: RowContext) -> Self {
        match self {
            Self::ParseFailure { reason, .. } => Self::ParseFailure {
                reason,
                row: Some(context),
            },
            Self::RangeViolation {
                field,
                value,
                min,
                max,
                ..
            } => Self::RangeViolation {
                field,
                value,
                min,
                max,
                row: Some(context),
            },
            other => other,
        }
    }

    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::ParseFailure { .. } => ErrorKind::ParseFailure,
            Self::RangeViolation { .. } => ErrorKind::RangeViolation,
            Self::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Row that triggered a row-level failure
    pub fn row(&self) -> Option<&RowContext> {
        match self {
            Self::ParseFailure { row, .. } | Self::RangeViolation { row, .. } => row.as_ref(),
            _ => None,
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(error: StoreError) -> Self {
        Self::PersistenceFailure {
            message: "error with database, please contact repository maintainer".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(error: csv::Error) -> Self {
        let row = error
            .position()
            .map(|position| RowContext::new(position.line(), String::new()));
        Self::ParseFailure {
            reason: format!("CSV parsing failed: {}", error),
            row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminant() {
        assert_eq!(
            IngestError::duplicate_name("a.csv").kind(),
            ErrorKind::DuplicateName
        );
        assert_eq!(
            IngestError::schema_violation("x").kind(),
            ErrorKind::SchemaViolation
        );
        assert_eq!(
            IngestError::parse_failure("x").kind(),
            ErrorKind::ParseFailure
        );
        assert_eq!(
            IngestError::range_violation("leaf_wetness", 1.5, &(0.0..=1.0)).kind(),
            ErrorKind::RangeViolation
        );
        assert_eq!(IngestError::cancelled("a.csv").kind(), ErrorKind::Cancelled);
        assert_eq!(
            IngestError::from(StoreError::Internal("boom".to_string())).kind(),
            ErrorKind::PersistenceFailure
        );
    }

    #[test]
    fn test_with_row_attaches_context() {
        let error = IngestError::parse_failure("Invalid number 'abc' for 'wind_gust'")
            .with_row(RowContext::new(3, "2023-05-01;12:00:00;abc"));

        let message = error.to_string();
        assert!(message.contains("Invalid number 'abc'"));
        assert!(message.contains("line 3"));
        assert!(message.contains("(2023-05-01;12:00:00;abc)"));
        assert_eq!(error.row().map(|row| row.line), Some(3));
    }

    #[test]
    fn test_with_row_ignores_other_kinds() {
        let error = IngestError::schema_violation("insufficient information")
            .with_row(RowContext::new(1, "date;time"));
        assert!(error.row().is_none());
        assert_eq!(error.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn test_range_violation_message() {
        let error = IngestError::range_violation("leaf_wetness", 1.5, &(0.0..=1.0))
            .with_row(RowContext::new(2, "2023-05-01;12:00:00;1,5"));
        let message = error.to_string();
        assert!(message.contains("leaf_wetness"));
        assert!(message.contains("1.5"));
        assert!(message.contains("(2023-05-01;12:00:00;1,5)"));
    }
}

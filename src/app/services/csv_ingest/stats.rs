//! Outcome of a successful upload

use std::time::Duration;

use serde::Serialize;

use crate::app::models::{Dataset, Dialect};

/// Confirmation message returned to the uploader
pub const SUCCESS_MESSAGE: &str = "Successfully uploaded file.";

/// Summary of a committed upload
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// The dataset that now holds the records
    pub dataset: Dataset,

    /// Dialect the file was parsed with
    pub dialect: Dialect,

    /// Number of data rows read (header excluded)
    pub rows_read: usize,

    /// Number of records the store reported as inserted
    pub records_inserted: usize,

    /// Wall time spent on the upload
    #[serde(skip)]
    pub elapsed: Duration,
}

impl IngestOutcome {
    /// Confirmation text for the uploader
    pub fn message(&self) -> &'static str {
        SUCCESS_MESSAGE
    }

    /// Records inserted per second
    pub fn throughput(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds == 0.0 {
            0.0
        } else {
            self.records_inserted as f64 / seconds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_and_throughput() {
        let outcome = IngestOutcome {
            dataset: Dataset::new("station.csv"),
            dialect: Dialect::Flexible,
            rows_read: 10,
            records_inserted: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(outcome.message(), "Successfully uploaded file.");
        assert_eq!(outcome.throughput(), 5.0);

        let instant = IngestOutcome {
            elapsed: Duration::ZERO,
            ..outcome
        };
        assert_eq!(instant.throughput(), 0.0);
    }
}

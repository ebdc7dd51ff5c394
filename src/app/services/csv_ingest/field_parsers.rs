//! Field parsing utilities for sensor CSV rows
//!
//! This module provides helper functions for locating a cell through the
//! column map and coercing it to the type its column carries.

use super::column_mapping::ColumnMap;
use crate::constants::{DATE_FORMAT, LOCALE_DECIMAL_SEPARATOR, TIME_FORMAT};
use crate::{IngestError, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};
use csv::StringRecord;

/// Parse the mandatory date field (`YYYY-MM-DD`)
pub fn parse_required_date(
    record: &StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<NaiveDate> {
    let value_str = get_required_field(record, mapping, field_name)?;

    NaiveDate::parse_from_str(value_str, DATE_FORMAT).map_err(|e| {
        IngestError::parse_failure(format!(
            "Invalid date format for {}: '{}' (expected 'YYYY-MM-DD': {})",
            field_name, value_str, e
        ))
    })
}

/// Parse the mandatory time field (`HH:MM:SS`)
pub fn parse_required_time(
    record: &StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<NaiveTime> {
    let value_str = get_required_field(record, mapping, field_name)?;

    let time = NaiveTime::parse_from_str(value_str, TIME_FORMAT).map_err(|e| {
        IngestError::parse_failure(format!(
            "Invalid time format for {}: '{}' (expected 'HH:MM:SS': {})",
            field_name, value_str, e
        ))
    })?;

    // chrono reads second 60 as a leap second; it is not a wall-clock time
    if time.nanosecond() >= 1_000_000_000 {
        return Err(IngestError::parse_failure(format!(
            "Invalid time for {}: '{}' (seconds must be 00-59)",
            field_name, value_str
        )));
    }

    Ok(time)
}

/// Parse an optional numeric field, accepting `,` as the decimal separator.
///
/// An unmapped column or an empty cell yields `None`; a non-empty cell that
/// is not a number is an error.
pub fn parse_optional_f64(
    record: &StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<Option<f64>> {
    let Some(value_str) = get_optional_field(record, mapping, field_name)? else {
        return Ok(None);
    };

    let trimmed = value_str.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    parse_decimal(trimmed).map(Some).ok_or_else(|| {
        IngestError::parse_failure(format!(
            "Invalid number for {}: '{}'",
            field_name, value_str
        ))
    })
}

/// Parse an optional text field, copied verbatim whenever the column is mapped.
///
/// An empty cell stays an empty string; only an unmapped column is `None`.
pub fn parse_optional_text(
    record: &StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<Option<String>> {
    Ok(get_optional_field(record, mapping, field_name)?.map(str::to_string))
}

/// Normalize the locale decimal separator and parse as f64
pub fn parse_decimal(value: &str) -> Option<f64> {
    value
        .replace(LOCALE_DECIMAL_SEPARATOR, ".")
        .parse::<f64>()
        .ok()
}

/// Get a required field value from a CSV row
pub fn get_required_field<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<&'a str> {
    let value = get_optional_field(record, mapping, field_name)?.ok_or_else(|| {
        IngestError::parse_failure(format!("Required column '{}' not found", field_name))
    })?;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IngestError::parse_failure(format!(
            "Empty value for required column '{}'",
            field_name
        )));
    }

    Ok(trimmed)
}

/// Get an optional field value from a CSV row.
///
/// `Ok(None)` means the column is not mapped. A mapped column beyond the end
/// of the row is a structurally short row.
pub fn get_optional_field<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMap,
    field_name: &str,
) -> Result<Option<&'a str>> {
    let Some(index) = mapping.get_index(field_name) else {
        return Ok(None);
    };

    record.get(index).map(Some).ok_or_else(|| {
        IngestError::parse_failure(format!(
            "No value for column '{}' (position {}, row has {} fields)",
            field_name,
            index + 1,
            record.len()
        ))
    })
}

//! Data models for agromet ingestion
//!
//! This module contains the core data structures for datasets and the
//! measurement records parsed from their uploaded files. Each CSV dialect has
//! its own typed measurement payload so that a column like `wind_direction`
//! keeps the type its dialect gives it.

use crate::constants::{LEAF_WETNESS_RANGE, columns};
use crate::{IngestError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Dialect
// =============================================================================

/// CSV layout accepted by the ingestion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Header-driven layout: columns located by name, any recognized subset
    #[default]
    Flexible,
    /// Fixed positional layout with fourteen fields; the header row is skipped
    Legacy,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Flexible => "flexible",
            Dialect::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flexible" => Ok(Dialect::Flexible),
            "legacy" => Ok(Dialect::Legacy),
            other => Err(format!(
                "Unknown dialect '{}' (expected 'flexible' or 'legacy')",
                other
            )),
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// A named collection of records originating from one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Identifier assigned at creation
    pub id: Uuid,

    /// Source filename, unique across all datasets
    pub name: String,
}

impl Dataset {
    /// Create a dataset with a freshly generated identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Measurement Payloads
// =============================================================================

/// Measurements recognized by the flexible dialect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub parcel_location: Option<String>,
    pub atmospheric_temperature: Option<f64>,
    pub atmospheric_temperature_daily_min: Option<f64>,
    pub atmospheric_temperature_daily_max: Option<f64>,
    pub atmospheric_temperature_daily_average: Option<f64>,
    pub atmospheric_relative_humidity: Option<f64>,
    pub atmospheric_pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub average_wind_speed: Option<f64>,
    /// Compass direction as written in the file (e.g. "NNE")
    pub wind_direction: Option<String>,
    pub wind_gust: Option<f64>,
    pub leaf_relative_humidity: Option<f64>,
    pub leaf_temperature: Option<f64>,
    /// Fraction of the leaf sensor that is wet, within [0, 1]
    pub leaf_wetness: Option<f64>,
    pub soil_temperature_10cm: Option<f64>,
    pub soil_temperature_20cm: Option<f64>,
    pub soil_temperature_30cm: Option<f64>,
    pub soil_temperature_40cm: Option<f64>,
    pub soil_temperature_50cm: Option<f64>,
    pub soil_temperature_60cm: Option<f64>,
    pub solar_irradiance_copernicus: Option<f64>,
}

/// Measurements of the legacy fixed-position dialect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyReading {
    /// NUTS level 3 region code
    pub nuts3: Option<String>,
    /// NUTS level 2 region code
    pub nuts2: Option<String>,
    pub temperature_air: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Direction in degrees
    pub wind_direction: Option<f64>,
    pub wind_gust: Option<f64>,
    pub atmospheric_pressure: Option<f64>,
    pub relative_humidity_canopy: Option<f64>,
    pub temperature_canopy: Option<f64>,
    pub solar_irradiance_copernicus: Option<f64>,
}

/// Dialect-specific measurement payload of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum Measurements {
    Flexible(SensorReading),
    Legacy(LegacyReading),
}

impl Measurements {
    /// Dialect the payload was parsed with
    pub fn dialect(&self) -> Dialect {
        match self {
            Measurements::Flexible(_) => Dialect::Flexible,
            Measurements::Legacy(_) => Dialect::Legacy,
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One parsed, validated measurement row belonging to a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Owning dataset
    pub dataset_id: Uuid,

    /// Calendar date of the reading
    pub date: NaiveDate,

    /// Time of day of the reading
    pub time: NaiveTime,

    /// Optional measurements
    pub measurements: Measurements,
}

impl Record {
    /// Create a new record with validation
    pub fn new(
        dataset_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        measurements: Measurements,
    ) -> Result<Self> {
        let record = Self {
            dataset_id,
            date,
            time,
            measurements,
        };

        record.validate()?;
        Ok(record)
    }

    /// Validate domain constraints on measurements
    pub fn validate(&self) -> Result<()> {
        if let Measurements::Flexible(reading) = &self.measurements {
            if let Some(wetness) = reading.leaf_wetness {
                // NaN falls outside the range as well
                if !LEAF_WETNESS_RANGE.contains(&wetness) {
                    return Err(IngestError::range_violation(
                        columns::LEAF_WETNESS,
                        wetness,
                        &LEAF_WETNESS_RANGE,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Flexible payload, if this record was parsed with the flexible dialect
    pub fn sensor_reading(&self) -> Option<&SensorReading> {
        match &self.measurements {
            Measurements::Flexible(reading) => Some(reading),
            Measurements::Legacy(_) => None,
        }
    }

    /// Legacy payload, if this record was parsed with the legacy dialect
    pub fn legacy_reading(&self) -> Option<&LegacyReading> {
        match &self.measurements {
            Measurements::Legacy(reading) => Some(reading),
            Measurements::Flexible(_) => None,
        }
    }
}

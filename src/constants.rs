//! Application constants for agromet ingestion
//!
//! This module contains the column catalogs, structural limits, formats,
//! and reference data used throughout the ingestion pipeline.

// =============================================================================
// File Format Constants
// =============================================================================

/// Field delimiter used by every supported upload
pub const DEFAULT_DELIMITER: u8 = b';';

/// UTF-8 byte-order mark stripped from the start of uploads
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Date format for the mandatory `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format for the mandatory `time` column
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Decimal separator accepted in place of `.` in numeric cells
pub const LOCALE_DECIMAL_SEPARATOR: char = ',';

/// File extension picked up when walking directories
pub const CSV_EXTENSION: &str = "csv";

// =============================================================================
// Structural Limits
// =============================================================================

/// Minimum number of header columns for a flexible upload
pub const MIN_HEADER_COLUMNS: usize = 3;

/// Minimum number of recognized columns after resolution (date, time and one measurement)
pub const MIN_RESOLVED_COLUMNS: usize = 3;

/// Number of positional fields every legacy row must carry
pub const LEGACY_MIN_FIELDS: usize = 14;

/// Inclusive bounds for leaf wetness (fraction of the sensor surface that is wet)
pub const LEAF_WETNESS_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

// =============================================================================
// Database Defaults
// =============================================================================

/// Special database target for a throwaway in-memory store
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Application directory created under the platform data dir
pub const APP_DATA_DIR: &str = "agromet-ingest";

/// Default database file name
pub const DEFAULT_DATABASE_FILE: &str = "agromet.duckdb";

/// Environment variable overriding the database target
pub const DATABASE_ENV_VAR: &str = "AGROMET_DATABASE";

// =============================================================================
// Column Name Constants
// =============================================================================

/// Semantic column names shared by both dialects or specific to one of them
pub mod columns {
    // Mandatory temporal columns
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";

    // Flexible dialect
    pub const PARCEL_LOCATION: &str = "parcel_location";
    pub const ATMOSPHERIC_TEMPERATURE: &str = "atmospheric_temperature";
    pub const ATMOSPHERIC_TEMPERATURE_DAILY_MIN: &str = "atmospheric_temperature_daily_min";
    pub const ATMOSPHERIC_TEMPERATURE_DAILY_MAX: &str = "atmospheric_temperature_daily_max";
    pub const ATMOSPHERIC_TEMPERATURE_DAILY_AVERAGE: &str =
        "atmospheric_temperature_daily_average";
    pub const ATMOSPHERIC_RELATIVE_HUMIDITY: &str = "atmospheric_relative_humidity";
    pub const ATMOSPHERIC_PRESSURE: &str = "atmospheric_pressure";
    pub const PRECIPITATION: &str = "precipitation";
    pub const AVERAGE_WIND_SPEED: &str = "average_wind_speed";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const WIND_GUST: &str = "wind_gust";
    pub const LEAF_RELATIVE_HUMIDITY: &str = "leaf_relative_humidity";
    pub const LEAF_TEMPERATURE: &str = "leaf_temperature";
    pub const LEAF_WETNESS: &str = "leaf_wetness";
    pub const SOIL_TEMPERATURE_10CM: &str = "soil_temperature_10cm";
    pub const SOIL_TEMPERATURE_20CM: &str = "soil_temperature_20cm";
    pub const SOIL_TEMPERATURE_30CM: &str = "soil_temperature_30cm";
    pub const SOIL_TEMPERATURE_40CM: &str = "soil_temperature_40cm";
    pub const SOIL_TEMPERATURE_50CM: &str = "soil_temperature_50cm";
    pub const SOIL_TEMPERATURE_60CM: &str = "soil_temperature_60cm";
    pub const SOLAR_IRRADIANCE_COPERNICUS: &str = "solar_irradiance_copernicus";

    // Legacy dialect
    pub const NUTS3: &str = "nuts3";
    pub const NUTS2: &str = "nuts2";
    pub const TEMPERATURE_AIR: &str = "temperature_air";
    pub const RELATIVE_HUMIDITY: &str = "relative_humidity";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const RELATIVE_HUMIDITY_CANOPY: &str = "relative_humidity_canopy";
    pub const TEMPERATURE_CANOPY: &str = "temperature_canopy";
}

/// Recognized column names of the flexible (header-driven) dialect, in catalog order
pub const FLEXIBLE_COLUMNS: &[&str] = &[
    columns::DATE,
    columns::TIME,
    columns::PARCEL_LOCATION,
    columns::ATMOSPHERIC_TEMPERATURE,
    columns::ATMOSPHERIC_TEMPERATURE_DAILY_MIN,
    columns::ATMOSPHERIC_TEMPERATURE_DAILY_MAX,
    columns::ATMOSPHERIC_TEMPERATURE_DAILY_AVERAGE,
    columns::ATMOSPHERIC_RELATIVE_HUMIDITY,
    columns::ATMOSPHERIC_PRESSURE,
    columns::PRECIPITATION,
    columns::AVERAGE_WIND_SPEED,
    columns::WIND_DIRECTION,
    columns::WIND_GUST,
    columns::LEAF_RELATIVE_HUMIDITY,
    columns::LEAF_TEMPERATURE,
    columns::LEAF_WETNESS,
    columns::SOIL_TEMPERATURE_10CM,
    columns::SOIL_TEMPERATURE_20CM,
    columns::SOIL_TEMPERATURE_30CM,
    columns::SOIL_TEMPERATURE_40CM,
    columns::SOIL_TEMPERATURE_50CM,
    columns::SOIL_TEMPERATURE_60CM,
    columns::SOLAR_IRRADIANCE_COPERNICUS,
];

/// Column names of the legacy dialect; the position in this slice is the field index
pub const LEGACY_COLUMNS: &[&str] = &[
    columns::DATE,
    columns::TIME,
    columns::NUTS3,
    columns::NUTS2,
    columns::TEMPERATURE_AIR,
    columns::RELATIVE_HUMIDITY,
    columns::PRECIPITATION,
    columns::WIND_SPEED,
    columns::WIND_DIRECTION,
    columns::WIND_GUST,
    columns::ATMOSPHERIC_PRESSURE,
    columns::RELATIVE_HUMIDITY_CANOPY,
    columns::TEMPERATURE_CANOPY,
    columns::SOLAR_IRRADIANCE_COPERNICUS,
];

// =============================================================================
// Reference Data
// =============================================================================

/// Measurement units seeded at startup as (measurement name, symbol)
pub const REFERENCE_UNITS: &[(&str, &str)] = &[
    ("temperature_air", "Celsius"),
    ("relative_humidity", "%"),
    ("precipitation", "mm"),
    ("wind_speed", "km/h"),
    ("wind_gust", "km/h"),
    ("atmospheric_pressure", "mbar"),
    ("relative_humidity_canopy", "%"),
    ("temperature_canopy", "°C"),
    ("solar_irradiance_copernicus", "W/m2"),
];

/// Comparison operators seeded at startup
pub const REFERENCE_OPERATORS: &[&str] = &[">", "<", ">=", "<=", "==", "!="];

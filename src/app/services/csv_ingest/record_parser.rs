//! Individual CSV row parsing
//!
//! This module turns one raw row into a validated [`Record`]. Both dialects go
//! through the same field helpers; only the set of columns and the type of
//! `wind_direction` differ.

use csv::StringRecord;
use uuid::Uuid;

use super::column_mapping::ColumnMap;
use super::field_parsers::{
    parse_optional_f64, parse_optional_text, parse_required_date, parse_required_time,
};
use crate::Result;
use crate::app::models::{Dialect, LegacyReading, Measurements, Record, SensorReading};
use crate::constants::columns;
use crate::error::RowContext;

/// Converts raw rows into records for one dialect
#[derive(Debug, Clone, Copy)]
pub struct RowParser {
    dialect: Dialect,
    delimiter: u8,
}

impl RowParser {
    pub fn new(dialect: Dialect, delimiter: u8) -> Self {
        Self { dialect, delimiter }
    }

    /// Parse a row into a record owned by `dataset_id`.
    ///
    /// Any failure carries the raw row for diagnostics.
    pub fn parse(
        &self,
        record: &StringRecord,
        mapping: &ColumnMap,
        dataset_id: Uuid,
    ) -> Result<Record> {
        self.parse_inner(record, mapping, dataset_id)
            .map_err(|e| e.with_row(self.row_context(record)))
    }

    fn parse_inner(
        &self,
        record: &StringRecord,
        mapping: &ColumnMap,
        dataset_id: Uuid,
    ) -> Result<Record> {
        let date = parse_required_date(record, mapping, columns::DATE)?;
        let time = parse_required_time(record, mapping, columns::TIME)?;

        let measurements = match self.dialect {
            Dialect::Flexible => Measurements::Flexible(parse_sensor_reading(record, mapping)?),
            Dialect::Legacy => Measurements::Legacy(parse_legacy_reading(record, mapping)?),
        };

        Record::new(dataset_id, date, time, measurements)
    }

    /// Raw row content re-joined with the upload delimiter
    pub fn row_context(&self, record: &StringRecord) -> RowContext {
        let separator = char::from(self.delimiter).to_string();
        let content = record.iter().collect::<Vec<_>>().join(&separator);
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        RowContext::new(line, content)
    }
}

/// Parse the measurements recognized by the flexible dialect
pub fn parse_sensor_reading(record: &StringRecord, mapping: &ColumnMap) -> Result<SensorReading> {
    let number = |name: &str| parse_optional_f64(record, mapping, name);
    let text = |name: &str| parse_optional_text(record, mapping, name);

    Ok(SensorReading {
        parcel_location: text(columns::PARCEL_LOCATION)?,
        atmospheric_temperature: number(columns::ATMOSPHERIC_TEMPERATURE)?,
        atmospheric_temperature_daily_min: number(columns::ATMOSPHERIC_TEMPERATURE_DAILY_MIN)?,
        atmospheric_temperature_daily_max: number(columns::ATMOSPHERIC_TEMPERATURE_DAILY_MAX)?,
        atmospheric_temperature_daily_average: number(
            columns::ATMOSPHERIC_TEMPERATURE_DAILY_AVERAGE,
        )?,
        atmospheric_relative_humidity: number(columns::ATMOSPHERIC_RELATIVE_HUMIDITY)?,
        atmospheric_pressure: number(columns::ATMOSPHERIC_PRESSURE)?,
        precipitation: number(columns::PRECIPITATION)?,
        average_wind_speed: number(columns::AVERAGE_WIND_SPEED)?,
        wind_direction: text(columns::WIND_DIRECTION)?,
        wind_gust: number(columns::WIND_GUST)?,
        leaf_relative_humidity: number(columns::LEAF_RELATIVE_HUMIDITY)?,
        leaf_temperature: number(columns::LEAF_TEMPERATURE)?,
        leaf_wetness: number(columns::LEAF_WETNESS)?,
        soil_temperature_10cm: number(columns::SOIL_TEMPERATURE_10CM)?,
        soil_temperature_20cm: number(columns::SOIL_TEMPERATURE_20CM)?,
        soil_temperature_30cm: number(columns::SOIL_TEMPERATURE_30CM)?,
        soil_temperature_40cm: number(columns::SOIL_TEMPERATURE_40CM)?,
        soil_temperature_50cm: number(columns::SOIL_TEMPERATURE_50CM)?,
        soil_temperature_60cm: number(columns::SOIL_TEMPERATURE_60CM)?,
        solar_irradiance_copernicus: number(columns::SOLAR_IRRADIANCE_COPERNICUS)?,
    })
}

/// Parse the measurements of the legacy fixed-position dialect
pub fn parse_legacy_reading(record: &StringRecord, mapping: &ColumnMap) -> Result<LegacyReading> {
    let number = |name: &str| parse_optional_f64(record, mapping, name);
    let text = |name: &str| parse_optional_text(record, mapping, name);

    Ok(LegacyReading {
        nuts3: text(columns::NUTS3)?,
        nuts2: text(columns::NUTS2)?,
        temperature_air: number(columns::TEMPERATURE_AIR)?,
        relative_humidity: number(columns::RELATIVE_HUMIDITY)?,
        precipitation: number(columns::PRECIPITATION)?,
        wind_speed: number(columns::WIND_SPEED)?,
        wind_direction: number(columns::WIND_DIRECTION)?,
        wind_gust: number(columns::WIND_GUST)?,
        atmospheric_pressure: number(columns::ATMOSPHERIC_PRESSURE)?,
        relative_humidity_canopy: number(columns::RELATIVE_HUMIDITY_CANOPY)?,
        temperature_canopy: number(columns::TEMPERATURE_CANOPY)?,
        solar_irradiance_copernicus: number(columns::SOLAR_IRRADIANCE_COPERNICUS)?,
    })
}

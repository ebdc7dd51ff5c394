//! DuckDB dataset store

use super::error::{StoreError, StoreResult};
use super::{DatasetBrowser, DatasetStore, DatasetSummary, ReferenceDataStore};
use crate::app::models::{Dataset, LegacyReading, Measurements, Record, SensorReading};
use crate::constants::{DATE_FORMAT, IN_MEMORY_DATABASE, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use duckdb::{Appender, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS dataset (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS sensor_data (
    dataset_id VARCHAR NOT NULL,
    date DATE NOT NULL,
    time TIME NOT NULL,
    parcel_location VARCHAR,
    atmospheric_temperature DOUBLE,
    atmospheric_temperature_daily_min DOUBLE,
    atmospheric_temperature_daily_max DOUBLE,
    atmospheric_temperature_daily_average DOUBLE,
    atmospheric_relative_humidity DOUBLE,
    atmospheric_pressure DOUBLE,
    precipitation DOUBLE,
    average_wind_speed DOUBLE,
    wind_direction VARCHAR,
    wind_gust DOUBLE,
    leaf_relative_humidity DOUBLE,
    leaf_temperature DOUBLE,
    leaf_wetness DOUBLE CHECK (leaf_wetness BETWEEN 0 AND 1),
    soil_temperature_10cm DOUBLE,
    soil_temperature_20cm DOUBLE,
    soil_temperature_30cm DOUBLE,
    soil_temperature_40cm DOUBLE,
    soil_temperature_50cm DOUBLE,
    soil_temperature_60cm DOUBLE,
    solar_irradiance_copernicus DOUBLE
);
CREATE TABLE IF NOT EXISTS legacy_data (
    dataset_id VARCHAR NOT NULL,
    date DATE NOT NULL,
    time TIME NOT NULL,
    nuts3 VARCHAR,
    nuts2 VARCHAR,
    temperature_air DOUBLE,
    relative_humidity DOUBLE,
    precipitation DOUBLE,
    wind_speed DOUBLE,
    wind_direction DOUBLE,
    wind_gust DOUBLE,
    atmospheric_pressure DOUBLE,
    relative_humidity_canopy DOUBLE,
    temperature_canopy DOUBLE,
    solar_irradiance_copernicus DOUBLE
);
CREATE TABLE IF NOT EXISTS unit (
    name VARCHAR PRIMARY KEY,
    symbol VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS operator (
    symbol VARCHAR PRIMARY KEY
);
";

const SELECT_SENSOR_SQL: &str = "SELECT CAST(date AS VARCHAR), CAST(time AS VARCHAR),
    parcel_location, atmospheric_temperature, atmospheric_temperature_daily_min,
    atmospheric_temperature_daily_max, atmospheric_temperature_daily_average,
    atmospheric_relative_humidity, atmospheric_pressure, precipitation, average_wind_speed,
    wind_direction, wind_gust, leaf_relative_humidity, leaf_temperature, leaf_wetness,
    soil_temperature_10cm, soil_temperature_20cm, soil_temperature_30cm,
    soil_temperature_40cm, soil_temperature_50cm, soil_temperature_60cm,
    solar_irradiance_copernicus
    FROM sensor_data WHERE dataset_id = ? ORDER BY rowid";

const SELECT_LEGACY_SQL: &str = "SELECT CAST(date AS VARCHAR), CAST(time AS VARCHAR),
    nuts3, nuts2, temperature_air, relative_humidity, precipitation, wind_speed,
    wind_direction, wind_gust, atmospheric_pressure, relative_humidity_canopy,
    temperature_canopy, solar_irradiance_copernicus
    FROM legacy_data WHERE dataset_id = ? ORDER BY rowid";

/// DuckDB-backed store
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Create a new in-memory DuckDB store
    pub fn in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Open (or create) a DuckDB database file
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::ConnectionError(format!(
                        "Failed to create database directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        info!("Opened DuckDB database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Open from a target string (handles the :memory: special case)
    pub fn open(target: &str) -> StoreResult<Self> {
        if target == IN_MEMORY_DATABASE {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(target))
        }
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock()?)
    }

    /// Run `body` inside BEGIN/COMMIT, rolling back on error
    fn transaction<F, T>(conn: &Connection, body: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| StoreError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(StoreError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = conn.execute_batch("ROLLBACK");
            }
        }
        result
    }

    /// Append one record as a full table row; the appender casts date and time text
    fn append_record(
        sensor: &mut Appender<'_>,
        legacy: &mut Appender<'_>,
        record: &Record,
    ) -> StoreResult<()> {
        let dataset_id = record.dataset_id.to_string();
        let date = record.date.format(DATE_FORMAT).to_string();
        let time = record.time.format(TIME_FORMAT).to_string();

        match &record.measurements {
            Measurements::Flexible(r) => {
                sensor.append_row(duckdb::params![
                    dataset_id,
                    date,
                    time,
                    r.parcel_location,
                    r.atmospheric_temperature,
                    r.atmospheric_temperature_daily_min,
                    r.atmospheric_temperature_daily_max,
                    r.atmospheric_temperature_daily_average,
                    r.atmospheric_relative_humidity,
                    r.atmospheric_pressure,
                    r.precipitation,
                    r.average_wind_speed,
                    r.wind_direction,
                    r.wind_gust,
                    r.leaf_relative_humidity,
                    r.leaf_temperature,
                    r.leaf_wetness,
                    r.soil_temperature_10cm,
                    r.soil_temperature_20cm,
                    r.soil_temperature_30cm,
                    r.soil_temperature_40cm,
                    r.soil_temperature_50cm,
                    r.soil_temperature_60cm,
                    r.solar_irradiance_copernicus,
                ])?;
            }
            Measurements::Legacy(r) => {
                legacy.append_row(duckdb::params![
                    dataset_id,
                    date,
                    time,
                    r.nuts3,
                    r.nuts2,
                    r.temperature_air,
                    r.relative_humidity,
                    r.precipitation,
                    r.wind_speed,
                    r.wind_direction,
                    r.wind_gust,
                    r.atmospheric_pressure,
                    r.relative_humidity_canopy,
                    r.temperature_canopy,
                    r.solar_irradiance_copernicus,
                ])?;
            }
        }
        Ok(())
    }

    fn read_date_time(row: &Row<'_>) -> duckdb::Result<(String, String)> {
        Ok((row.get(0)?, row.get(1)?))
    }

    fn decode_date_time(date: &str, time: &str) -> StoreResult<(NaiveDate, NaiveTime)> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| StoreError::Decode(format!("date '{}': {}", date, e)))?;
        let time = NaiveTime::parse_from_str(time, TIME_FORMAT)
            .map_err(|e| StoreError::Decode(format!("time '{}': {}", time, e)))?;
        Ok((date, time))
    }

    fn sensor_records(conn: &Connection, id: Uuid) -> StoreResult<Vec<Record>> {
        let mut stmt = conn.prepare(SELECT_SENSOR_SQL)?;
        let rows = stmt.query_map(duckdb::params![id.to_string()], |row| {
            let (date, time) = Self::read_date_time(row)?;
            let reading = SensorReading {
                parcel_location: row.get(2)?,
                atmospheric_temperature: row.get(3)?,
                atmospheric_temperature_daily_min: row.get(4)?,
                atmospheric_temperature_daily_max: row.get(5)?,
                atmospheric_temperature_daily_average: row.get(6)?,
                atmospheric_relative_humidity: row.get(7)?,
                atmospheric_pressure: row.get(8)?,
                precipitation: row.get(9)?,
                average_wind_speed: row.get(10)?,
                wind_direction: row.get(11)?,
                wind_gust: row.get(12)?,
                leaf_relative_humidity: row.get(13)?,
                leaf_temperature: row.get(14)?,
                leaf_wetness: row.get(15)?,
                soil_temperature_10cm: row.get(16)?,
                soil_temperature_20cm: row.get(17)?,
                soil_temperature_30cm: row.get(18)?,
                soil_temperature_40cm: row.get(19)?,
                soil_temperature_50cm: row.get(20)?,
                soil_temperature_60cm: row.get(21)?,
                solar_irradiance_copernicus: row.get(22)?,
            };
            Ok((date, time, reading))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (date, time, reading) = row?;
            let (date, time) = Self::decode_date_time(&date, &time)?;
            records.push(Record {
                dataset_id: id,
                date,
                time,
                measurements: Measurements::Flexible(reading),
            });
        }
        Ok(records)
    }

    fn legacy_records(conn: &Connection, id: Uuid) -> StoreResult<Vec<Record>> {
        let mut stmt = conn.prepare(SELECT_LEGACY_SQL)?;
        let rows = stmt.query_map(duckdb::params![id.to_string()], |row| {
            let (date, time) = Self::read_date_time(row)?;
            let reading = LegacyReading {
                nuts3: row.get(2)?,
                nuts2: row.get(3)?,
                temperature_air: row.get(4)?,
                relative_humidity: row.get(5)?,
                precipitation: row.get(6)?,
                wind_speed: row.get(7)?,
                wind_direction: row.get(8)?,
                wind_gust: row.get(9)?,
                atmospheric_pressure: row.get(10)?,
                relative_humidity_canopy: row.get(11)?,
                temperature_canopy: row.get(12)?,
                solar_irradiance_copernicus: row.get(13)?,
            };
            Ok((date, time, reading))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (date, time, reading) = row?;
            let (date, time) = Self::decode_date_time(&date, &time)?;
            records.push(Record {
                dataset_id: id,
                date,
                time,
                measurements: Measurements::Legacy(reading),
            });
        }
        Ok(records)
    }
}

fn parse_dataset_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Decode(format!("dataset id '{}': {}", raw, e)))
}

impl DatasetStore for DuckDbStore {
    fn find_dataset_by_name(&self, name: &str) -> StoreResult<Option<Dataset>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name FROM dataset WHERE name = ?")?;
        let mut rows = stmt.query(duckdb::params![name])?;

        match rows.next()? {
            Some(row) => {
                let id: String = row.get(0)?;
                let name: String = row.get(1)?;
                Ok(Some(Dataset {
                    id: parse_dataset_id(&id)?,
                    name,
                }))
            }
            None => Ok(None),
        }
    }

    fn create_dataset(&self, name: &str) -> StoreResult<Dataset> {
        let conn = self.lock()?;
        let dataset = Dataset::new(name);

        conn.execute(
            "INSERT INTO dataset (id, name) VALUES (?, ?)",
            duckdb::params![dataset.id.to_string(), dataset.name],
        )
        .map_err(|e| match StoreError::from(e) {
            StoreError::DuplicateName(_) => StoreError::DuplicateName(name.to_string()),
            other => other,
        })?;

        debug!("Created dataset {} ({})", dataset.name, dataset.id);
        Ok(dataset)
    }

    fn delete_dataset(&self, id: Uuid) -> StoreResult<()> {
        let conn = self.lock()?;
        let id = id.to_string();

        // No ON DELETE CASCADE in DuckDB: children first
        Self::transaction(&conn, |conn| {
            conn.execute("DELETE FROM sensor_data WHERE dataset_id = ?", duckdb::params![id])?;
            conn.execute("DELETE FROM legacy_data WHERE dataset_id = ?", duckdb::params![id])?;
            conn.execute("DELETE FROM dataset WHERE id = ?", duckdb::params![id])?;
            Ok(())
        })
    }

    fn bulk_insert_records(&self, records: &[Record]) -> StoreResult<usize> {
        let conn = self.lock()?;

        Self::transaction(&conn, |conn| {
            let mut sensor = conn.appender("sensor_data")?;
            let mut legacy = conn.appender("legacy_data")?;
            for record in records {
                Self::append_record(&mut sensor, &mut legacy, record)?;
            }
            // Constraint failures surface on flush; both must land before COMMIT
            sensor.flush()?;
            legacy.flush()?;
            Ok(records.len())
        })
    }
}

impl DatasetBrowser for DuckDbStore {
    fn list_datasets(&self) -> StoreResult<Vec<DatasetSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT d.id, d.name,
                (SELECT COUNT(*) FROM sensor_data s WHERE s.dataset_id = d.id)
                + (SELECT COUNT(*) FROM legacy_data l WHERE l.dataset_id = d.id)
             FROM dataset d ORDER BY d.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, count) = row?;
            summaries.push(DatasetSummary {
                dataset: Dataset {
                    id: parse_dataset_id(&id)?,
                    name,
                },
                record_count: count as usize,
            });
        }
        Ok(summaries)
    }

    fn records_for_dataset(&self, id: Uuid) -> StoreResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut records = Self::sensor_records(&conn, id)?;
        records.extend(Self::legacy_records(&conn, id)?);
        Ok(records)
    }
}

impl ReferenceDataStore for DuckDbStore {
    fn insert_unit(&self, name: &str, symbol: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO unit (name, symbol) VALUES (?, ?)",
            duckdb::params![name, symbol],
        )?;
        Ok(changed > 0)
    }

    fn insert_operator(&self, symbol: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO operator (symbol) VALUES (?)",
            duckdb::params![symbol],
        )?;
        Ok(changed > 0)
    }

    fn units(&self) -> StoreResult<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name, symbol FROM unit ORDER BY name")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut units = Vec::new();
        for row in rows {
            units.push(row?);
        }
        Ok(units)
    }

    fn operators(&self) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT symbol FROM operator ORDER BY symbol")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut operators = Vec::new();
        for row in rows {
            operators.push(row?);
        }
        Ok(operators)
    }
}

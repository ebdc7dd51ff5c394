//! Column resolution for the supported CSV dialects
//!
//! A [`ColumnResolver`] turns a file's header row into a [`ColumnMap`] and
//! checks every data row against the structure that map implies. The flexible
//! dialect locates columns by header name; the legacy dialect ignores the
//! header and uses fixed positions.

use super::catalog::ColumnCatalog;
use crate::app::models::Dialect;
use crate::constants::{LEGACY_MIN_FIELDS, MIN_HEADER_COLUMNS, MIN_RESOLVED_COLUMNS, columns};
use crate::{IngestError, Result};
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Semantic column name to zero-based row position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,

    /// Header names that are not part of the catalog
    pub ignored_columns: Vec<String>,
}

impl ColumnMap {
    /// Get the index for a given column name
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index.get(column_name).copied()
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.name_to_index.contains_key(column_name)
    }

    /// Number of recognized columns
    pub fn len(&self) -> usize {
        self.name_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_index.is_empty()
    }

    /// Minimum number of fields a row needs to reach every mapped column
    pub fn width(&self) -> usize {
        self.name_to_index
            .values()
            .max()
            .map(|index| index + 1)
            .unwrap_or(0)
    }

    /// Get statistics about the column map as (recognized, ignored)
    pub fn stats(&self) -> (usize, usize) {
        (self.name_to_index.len(), self.ignored_columns.len())
    }
}

/// Strategy for locating columns in an upload
pub trait ColumnResolver: Send + Sync {
    /// Dialect this resolver implements
    fn dialect(&self) -> Dialect;

    /// Build the column map from the header row, rejecting unusable structures
    fn resolve_header(&self, header: &StringRecord) -> Result<ColumnMap>;

    /// Check that a data row is long enough for the resolved map
    fn check_row(&self, row: &StringRecord, map: &ColumnMap) -> Result<()>;
}

/// Select the resolver for a dialect
pub fn resolver_for(dialect: Dialect) -> Box<dyn ColumnResolver> {
    match dialect {
        Dialect::Flexible => Box::new(FlexibleResolver::new()),
        Dialect::Legacy => Box::new(LegacyResolver::new()),
    }
}

/// Header-driven resolution
#[derive(Debug, Clone)]
pub struct FlexibleResolver {
    catalog: ColumnCatalog,
}

impl FlexibleResolver {
    pub fn new() -> Self {
        Self {
            catalog: ColumnCatalog::for_dialect(Dialect::Flexible),
        }
    }
}

impl Default for FlexibleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnResolver for FlexibleResolver {
    fn dialect(&self) -> Dialect {
        Dialect::Flexible
    }

    fn resolve_header(&self, header: &StringRecord) -> Result<ColumnMap> {
        let names: Vec<&str> = header.iter().map(str::trim).collect();
        let distinct: HashSet<&str> = names.iter().copied().collect();

        if distinct.len() > self.catalog.len() {
            return Err(IngestError::schema_violation(format!(
                "dataset has more columns than supported ({} found, at most {} recognized)",
                distinct.len(),
                self.catalog.len()
            )));
        }

        if names.len() < MIN_HEADER_COLUMNS {
            return Err(IngestError::schema_violation(format!(
                "insufficient information: header has {} columns, at least {} required",
                names.len(),
                MIN_HEADER_COLUMNS
            )));
        }

        let missing: Vec<&str> = [columns::DATE, columns::TIME]
            .into_iter()
            .filter(|mandatory| !distinct.contains(mandatory))
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::schema_violation(format!(
                "mandatory columns missing: {}",
                missing.join(", ")
            )));
        }

        let mut map = ColumnMap::default();
        for (index, name) in names.iter().enumerate() {
            if !self.catalog.contains(name) {
                debug!("Ignoring unrecognized column '{}' at position {}", name, index);
                map.ignored_columns.push(name.to_string());
                continue;
            }

            if let Some(existing) = map.get_index(name) {
                warn!(
                    "Column '{}' repeated at position {}, keeping position {}",
                    name, index, existing
                );
                continue;
            }

            map.name_to_index.insert(name.to_string(), index);
        }

        if map.len() < MIN_RESOLVED_COLUMNS {
            return Err(IngestError::schema_violation(format!(
                "insufficient information: only {} recognized columns, at least one measurement besides date and time is required",
                map.len()
            )));
        }

        Ok(map)
    }

    fn check_row(&self, row: &StringRecord, map: &ColumnMap) -> Result<()> {
        let width = map.width();
        if row.len() < width {
            return Err(IngestError::parse_failure(format!(
                "row has {} fields but the header maps {} columns",
                row.len(),
                width
            )));
        }
        Ok(())
    }
}

/// Fixed-position resolution; the header row is not inspected
#[derive(Debug, Clone)]
pub struct LegacyResolver {
    catalog: ColumnCatalog,
}

impl LegacyResolver {
    pub fn new() -> Self {
        Self {
            catalog: ColumnCatalog::for_dialect(Dialect::Legacy),
        }
    }
}

impl Default for LegacyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnResolver for LegacyResolver {
    fn dialect(&self) -> Dialect {
        Dialect::Legacy
    }

    fn resolve_header(&self, _header: &StringRecord) -> Result<ColumnMap> {
        let name_to_index = self
            .catalog
            .names()
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_string(), index))
            .collect();

        Ok(ColumnMap {
            name_to_index,
            ignored_columns: Vec::new(),
        })
    }

    fn check_row(&self, row: &StringRecord, _map: &ColumnMap) -> Result<()> {
        if row.len() < LEGACY_MIN_FIELDS {
            return Err(IngestError::parse_failure(format!(
                "file does not conform to standard (missing columns): expected at least {} fields, found {}",
                LEGACY_MIN_FIELDS,
                row.len()
            )));
        }
        Ok(())
    }
}

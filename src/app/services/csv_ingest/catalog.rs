//! Recognized column names per dialect

use crate::app::models::Dialect;
use crate::constants::{FLEXIBLE_COLUMNS, LEGACY_COLUMNS};

/// Ordered, static set of semantic column names a dialect understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCatalog {
    dialect: Dialect,
    names: &'static [&'static str],
}

impl ColumnCatalog {
    /// Catalog for the given dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        let names = match dialect {
            Dialect::Flexible => FLEXIBLE_COLUMNS,
            Dialect::Legacy => LEGACY_COLUMNS,
        };
        Self { dialect, names }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Recognized names in catalog order
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    /// Catalog position of a name; for the legacy dialect this is the field index
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| *candidate == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::columns;

    #[test]
    fn test_flexible_catalog() {
        let catalog = ColumnCatalog::for_dialect(Dialect::Flexible);
        assert_eq!(catalog.len(), 23);
        assert_eq!(catalog.names()[0], columns::DATE);
        assert_eq!(catalog.names()[1], columns::TIME);
        assert!(catalog.contains(columns::LEAF_WETNESS));
        assert!(!catalog.contains(columns::NUTS3));
    }

    #[test]
    fn test_legacy_positions() {
        let catalog = ColumnCatalog::for_dialect(Dialect::Legacy);
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.position(columns::NUTS3), Some(2));
        assert_eq!(catalog.position(columns::WIND_DIRECTION), Some(8));
        assert_eq!(catalog.position(columns::SOLAR_IRRADIANCE_COPERNICUS), Some(13));
        assert_eq!(catalog.position(columns::LEAF_WETNESS), None);
    }
}

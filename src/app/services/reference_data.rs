//! Reference data seeding
//!
//! Units and comparison operators are lookup tables the rest of the system
//! reads but never writes. They are seeded once, explicitly, through a storage
//! handle passed in by the caller.

use crate::app::services::dataset_store::{ReferenceDataStore, StoreResult};
use crate::constants::{REFERENCE_OPERATORS, REFERENCE_UNITS};
use tracing::{debug, info};

/// Rows added by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub units_inserted: usize,
    pub operators_inserted: usize,
}

/// Insert the standard units and operators; existing entries are left alone
pub fn seed_reference_data(store: &dyn ReferenceDataStore) -> StoreResult<SeedStats> {
    let mut stats = SeedStats::default();

    for (name, symbol) in REFERENCE_UNITS {
        if store.insert_unit(name, symbol)? {
            stats.units_inserted += 1;
        } else {
            debug!("Unit '{}' already present", name);
        }
    }

    for symbol in REFERENCE_OPERATORS {
        if store.insert_operator(symbol)? {
            stats.operators_inserted += 1;
        }
    }

    info!(
        "Seeded reference data: {} units, {} operators",
        stats.units_inserted, stats.operators_inserted
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::dataset_store::{DuckDbStore, MemoryStore};

    #[test]
    fn test_seed_memory_store() {
        let store = MemoryStore::new();
        let stats = seed_reference_data(&store).unwrap();
        assert_eq!(
            stats,
            SeedStats {
                units_inserted: 9,
                operators_inserted: 6
            }
        );

        let units = store.units().unwrap();
        assert!(units.contains(&("precipitation".to_string(), "mm".to_string())));
        assert!(units.contains(&("temperature_canopy".to_string(), "°C".to_string())));
        assert_eq!(store.operators().unwrap().len(), 6);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = DuckDbStore::in_memory().unwrap();
        seed_reference_data(&store).unwrap();
        let second = seed_reference_data(&store).unwrap();

        assert_eq!(second, SeedStats::default());
        assert_eq!(store.units().unwrap().len(), 9);
        assert!(store.operators().unwrap().contains(&"!=".to_string()));
    }
}

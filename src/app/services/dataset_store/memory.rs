//! In-process dataset store

use super::error::{StoreError, StoreResult};
use super::{DatasetBrowser, DatasetStore, DatasetSummary, ReferenceDataStore};
use crate::app::models::{Dataset, Record};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    datasets: Vec<Dataset>,
    records: Vec<Record>,
    units: BTreeMap<String, String>,
    operators: BTreeSet<String>,
}

/// Mutex-guarded store holding everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        Ok(self.state.lock()?)
    }

    /// Total number of records across all datasets
    pub fn record_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.records.len())
    }
}

impl DatasetStore for MemoryStore {
    fn find_dataset_by_name(&self, name: &str) -> StoreResult<Option<Dataset>> {
        let state = self.lock()?;
        Ok(state.datasets.iter().find(|d| d.name == name).cloned())
    }

    fn create_dataset(&self, name: &str) -> StoreResult<Dataset> {
        let mut state = self.lock()?;
        if state.datasets.iter().any(|d| d.name == name) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let dataset = Dataset::new(name);
        state.datasets.push(dataset.clone());
        debug!("Created dataset {} ({})", dataset.name, dataset.id);
        Ok(dataset)
    }

    fn delete_dataset(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.records.retain(|r| r.dataset_id != id);
        state.datasets.retain(|d| d.id != id);
        Ok(())
    }

    fn bulk_insert_records(&self, records: &[Record]) -> StoreResult<usize> {
        let mut state = self.lock()?;

        // Validate the whole batch before touching state
        for record in records {
            if !state.datasets.iter().any(|d| d.id == record.dataset_id) {
                return Err(StoreError::ExecutionError(format!(
                    "record references unknown dataset {}",
                    record.dataset_id
                )));
            }
        }

        state.records.extend_from_slice(records);
        Ok(records.len())
    }
}

impl DatasetBrowser for MemoryStore {
    fn list_datasets(&self) -> StoreResult<Vec<DatasetSummary>> {
        let state = self.lock()?;
        let mut summaries: Vec<DatasetSummary> = state
            .datasets
            .iter()
            .map(|dataset| DatasetSummary {
                dataset: dataset.clone(),
                record_count: state
                    .records
                    .iter()
                    .filter(|r| r.dataset_id == dataset.id)
                    .count(),
            })
            .collect();
        summaries.sort_by(|a, b| a.dataset.name.cmp(&b.dataset.name));
        Ok(summaries)
    }

    fn records_for_dataset(&self, id: Uuid) -> StoreResult<Vec<Record>> {
        let state = self.lock()?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.dataset_id == id)
            .cloned()
            .collect())
    }
}

impl ReferenceDataStore for MemoryStore {
    fn insert_unit(&self, name: &str, symbol: &str) -> StoreResult<bool> {
        let mut state = self.lock()?;
        if state.units.contains_key(name) {
            return Ok(false);
        }
        state.units.insert(name.to_string(), symbol.to_string());
        Ok(true)
    }

    fn insert_operator(&self, symbol: &str) -> StoreResult<bool> {
        Ok(self.lock()?.operators.insert(symbol.to_string()))
    }

    fn units(&self) -> StoreResult<Vec<(String, String)>> {
        Ok(self
            .lock()?
            .units
            .iter()
            .map(|(name, symbol)| (name.clone(), symbol.clone()))
            .collect())
    }

    fn operators(&self) -> StoreResult<Vec<String>> {
        Ok(self.lock()?.operators.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{Measurements, SensorReading};
    use chrono::{NaiveDate, NaiveTime};

    fn record_for(dataset_id: Uuid) -> Record {
        Record::new(
            dataset_id,
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            Measurements::Flexible(SensorReading {
                atmospheric_temperature: Some(21.5),
                ..Default::default()
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_find() {
        let store = MemoryStore::new();
        let created = store.create_dataset("a.csv").unwrap();

        let found = store.find_dataset_by_name("a.csv").unwrap();
        assert_eq!(found, Some(created));
        assert!(store.find_dataset_by_name("b.csv").unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let store = MemoryStore::new();
        store.create_dataset("a.csv").unwrap();

        let err = store.create_dataset("a.csv").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(name) if name == "a.csv"));
    }

    #[test]
    fn test_delete_cascades_to_records() {
        let store = MemoryStore::new();
        let keep = store.create_dataset("keep.csv").unwrap();
        let drop = store.create_dataset("drop.csv").unwrap();
        store
            .bulk_insert_records(&[record_for(keep.id), record_for(drop.id), record_for(drop.id)])
            .unwrap();

        store.delete_dataset(drop.id).unwrap();

        assert_eq!(store.record_count().unwrap(), 1);
        assert!(store.find_dataset_by_name("drop.csv").unwrap().is_none());
        assert_eq!(store.records_for_dataset(keep.id).unwrap().len(), 1);
    }

    #[test]
    fn test_bulk_insert_is_all_or_nothing() {
        let store = MemoryStore::new();
        let dataset = store.create_dataset("a.csv").unwrap();

        let result =
            store.bulk_insert_records(&[record_for(dataset.id), record_for(Uuid::new_v4())]);

        assert!(result.is_err());
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_list_datasets_sorted_with_counts() {
        let store = MemoryStore::new();
        let b = store.create_dataset("b.csv").unwrap();
        store.create_dataset("a.csv").unwrap();
        store.bulk_insert_records(&[record_for(b.id)]).unwrap();

        let summaries = store.list_datasets().unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.dataset.name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(summaries[0].record_count, 0);
        assert_eq!(summaries[1].record_count, 1);
    }

    #[test]
    fn test_reference_inserts_are_idempotent() {
        let store = MemoryStore::new();
        assert!(store.insert_unit("precipitation", "mm").unwrap());
        assert!(!store.insert_unit("precipitation", "mm").unwrap());
        assert!(store.insert_operator(">=").unwrap());
        assert!(!store.insert_operator(">=").unwrap());

        assert_eq!(
            store.units().unwrap(),
            vec![("precipitation".to_string(), "mm".to_string())]
        );
        assert_eq!(store.operators().unwrap(), vec![">=".to_string()]);
    }
}

//! In-process store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{
    apply_override, check_dataset_id, check_ingestion, replace_fields, sync_dataset_type, PropertyStore,
};
use crate::error::{Result, VizierError};
use crate::schema::{DatasetProperties, FieldProperties, FieldType};

/// Property store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    fields: RwLock<HashMap<String, Vec<FieldProperties>>>,
    datasets: RwLock<HashMap<String, DatasetProperties>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> VizierError {
    VizierError::Persistence("store lock poisoned".to_string())
}

impl PropertyStore for MemoryStore {
    fn save_field_properties(&self, dataset_id: &str, fields: &[FieldProperties]) -> Result<()> {
        check_dataset_id(dataset_id)?;
        let mut map = self.fields.write().map_err(poisoned)?;
        let stored = map.get(dataset_id).map(Vec::as_slice).unwrap_or_default();
        let replaced = replace_fields(stored, fields)?;
        map.insert(dataset_id.to_string(), replaced);
        Ok(())
    }

    fn save_dataset_properties(&self, dataset_id: &str, dataset: &DatasetProperties) -> Result<()> {
        check_dataset_id(dataset_id)?;
        dataset.validate()?;
        self.datasets
            .write()
            .map_err(poisoned)?
            .insert(dataset_id.to_string(), dataset.clone());
        Ok(())
    }

    fn field_properties(&self, dataset_id: &str) -> Result<Vec<FieldProperties>> {
        let map = self.fields.read().map_err(poisoned)?;
        Ok(map.get(dataset_id).cloned().unwrap_or_default())
    }

    fn dataset_properties(&self, dataset_id: &str) -> Result<Option<DatasetProperties>> {
        let map = self.datasets.read().map_err(poisoned)?;
        Ok(map.get(dataset_id).cloned())
    }

    fn save_ingestion(
        &self,
        dataset_id: &str,
        fields: &[FieldProperties],
        dataset: &DatasetProperties,
    ) -> Result<()> {
        check_dataset_id(dataset_id)?;
        check_ingestion(fields, dataset)?;

        let mut field_map = self.fields.write().map_err(poisoned)?;
        let mut dataset_map = self.datasets.write().map_err(poisoned)?;
        let stored = field_map.get(dataset_id).map(Vec::as_slice).unwrap_or_default();
        let replaced = replace_fields(stored, fields)?;

        let mut dataset = dataset.clone();
        for field in replaced.iter().filter(|f| f.manual) {
            sync_dataset_type(&mut dataset, field);
        }
        field_map.insert(dataset_id.to_string(), replaced);
        dataset_map.insert(dataset_id.to_string(), dataset);
        Ok(())
    }

    fn override_field_type(&self, dataset_id: &str, name: &str, field_type: FieldType) -> Result<FieldProperties> {
        let mut field_map = self.fields.write().map_err(poisoned)?;
        let mut dataset_map = self.datasets.write().map_err(poisoned)?;
        let fields = field_map
            .get_mut(dataset_id)
            .ok_or_else(|| VizierError::UnknownColumn(name.to_string()))?;
        let updated = apply_override(fields, name, field_type)?;
        if let Some(dataset) = dataset_map.get_mut(dataset_id) {
            sync_dataset_type(dataset, &updated);
        }
        Ok(updated)
    }
}

//! Persistence of field and dataset property records.
//!
//! Each ingestion replaces a dataset's field set and its dataset record.
//! Every record is validated before it is written, and a manual type
//! override already in the store survives re-ingestion as long as its
//! column is still present.

mod json;
mod memory;

pub use json::{DEFAULT_STALE_LOCK_AFTER, JsonStore};
pub use memory::MemoryStore;

use crate::error::{Result, VizierError};
use crate::schema::{DatasetProperties, FieldProperties, FieldType};

/// Storage for inferred properties.
pub trait PropertyStore: Send + Sync {
    /// Replace the field set, keeping manual overrides for names still present.
    fn save_field_properties(&self, dataset_id: &str, fields: &[FieldProperties]) -> Result<()>;

    /// Replace the dataset record.
    fn save_dataset_properties(&self, dataset_id: &str, dataset: &DatasetProperties) -> Result<()>;

    /// Stored field records, in column order. Empty if none are stored.
    fn field_properties(&self, dataset_id: &str) -> Result<Vec<FieldProperties>>;

    fn dataset_properties(&self, dataset_id: &str) -> Result<Option<DatasetProperties>>;

    /// Save the field set and the dataset record of one ingestion run.
    ///
    /// Both are validated first. Either both are stored or the store is left
    /// as it was.
    fn save_ingestion(
        &self,
        dataset_id: &str,
        fields: &[FieldProperties],
        dataset: &DatasetProperties,
    ) -> Result<()>;

    /// Set a field's type by hand. Fails with `UnknownColumn` if the field is not stored.
    ///
    /// The stored dataset record's `field_types` follows the override.
    fn override_field_type(&self, dataset_id: &str, name: &str, field_type: FieldType) -> Result<FieldProperties>;
}

/// Reject dataset ids that cannot be used as a storage key.
pub(crate) fn check_dataset_id(dataset_id: &str) -> Result<()> {
    let ok = !dataset_id.is_empty()
        && dataset_id != "."
        && dataset_id != ".."
        && !dataset_id.contains(['/', '\\', '\0']);
    if ok {
        Ok(())
    } else {
        Err(VizierError::InvalidRecord(format!("invalid dataset id '{dataset_id}'")))
    }
}

/// Validate incoming records and build the field set that replaces the stored one.
///
/// Stored fields absent from `incoming` are dropped. A stored manual override
/// carries over to the incoming field of the same name. The result is sorted
/// by column index.
pub(crate) fn replace_fields(
    stored: &[FieldProperties],
    incoming: &[FieldProperties],
) -> Result<Vec<FieldProperties>> {
    for field in incoming {
        field.validate()?;
    }

    let mut replaced: Vec<FieldProperties> = incoming.to_vec();
    carry_overrides(&mut replaced, stored);
    replaced.sort_by_key(|f| f.index);
    for (position, field) in replaced.iter().enumerate() {
        if field.index != position {
            return Err(VizierError::InvalidRecord(format!(
                "field '{}' has index {} at position {}",
                field.name, field.index, position
            )));
        }
    }
    Ok(replaced)
}

/// Apply stored manual overrides to `fields` by name. Returns whether any applied.
pub fn carry_overrides(fields: &mut [FieldProperties], stored: &[FieldProperties]) -> bool {
    let mut applied = false;
    for field in fields.iter_mut() {
        if let Some(previous) = stored.iter().find(|s| s.manual && s.name == field.name) {
            field.keep_manual_override(previous);
            applied = true;
        }
    }
    applied
}

/// Validate one ingestion's records against each other.
pub(crate) fn check_ingestion(fields: &[FieldProperties], dataset: &DatasetProperties) -> Result<()> {
    dataset.validate()?;
    if fields.len() != dataset.n_cols {
        return Err(VizierError::InvalidRecord(format!(
            "{} field records for a dataset of {} columns",
            fields.len(),
            dataset.n_cols
        )));
    }
    Ok(())
}

/// Keep the dataset record's type list in step with an overridden field.
pub(crate) fn sync_dataset_type(dataset: &mut DatasetProperties, field: &FieldProperties) {
    if let Some(slot) = dataset.field_types.get_mut(field.index) {
        *slot = field.field_type();
    }
}

/// Apply an override to the named field within `fields`.
pub(crate) fn apply_override(
    fields: &mut [FieldProperties],
    name: &str,
    field_type: FieldType,
) -> Result<FieldProperties> {
    let field = fields
        .iter_mut()
        .find(|f| f.name == name)
        .ok_or_else(|| VizierError::UnknownColumn(name.to_string()))?;
    field.override_type(field_type);
    Ok(field.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dataset_id() {
        assert!(check_dataset_id("sales-2020").is_ok());
        for bad in ["", "..", "a/b", "a\\b"] {
            assert!(check_dataset_id(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_replace_keeps_override_and_drops_absent_fields() {
        let mut zip = FieldProperties::with_type(1, "zip", FieldType::Integer);
        zip.override_type(FieldType::String);
        let mut old = FieldProperties::with_type(0, "old", FieldType::Integer);
        old.override_type(FieldType::String);
        let stored = vec![old, zip];

        let incoming = vec![
            FieldProperties::with_type(0, "new", FieldType::Integer),
            FieldProperties::with_type(1, "zip", FieldType::Integer),
        ];
        let replaced = replace_fields(&stored, &incoming).unwrap();

        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced[0].name, "new");
        assert_eq!(replaced[0].field_type(), FieldType::Integer);
        assert!(!replaced[0].manual);
        assert_eq!(replaced[1].field_type(), FieldType::String);
        assert!(replaced[1].manual);
    }

    #[test]
    fn test_replace_rejects_invalid() {
        let mut bad = FieldProperties::with_type(0, "a", FieldType::String);
        bad.child = Some("a".into());
        assert!(replace_fields(&[], &[bad]).is_err());

        let gap = vec![
            FieldProperties::with_type(0, "a", FieldType::String),
            FieldProperties::with_type(0, "b", FieldType::String),
        ];
        assert!(matches!(replace_fields(&[], &gap), Err(VizierError::InvalidRecord(_))));
    }

    #[test]
    fn test_check_ingestion_column_count() {
        let fields = vec![FieldProperties::with_type(0, "a", FieldType::String)];
        let one = DatasetProperties::new(2, vec!["a".into()], vec![FieldType::String], None);
        let two = DatasetProperties::new(
            2,
            vec!["a".into(), "b".into()],
            vec![FieldType::String, FieldType::String],
            None,
        );
        assert!(check_ingestion(&fields, &one).is_ok());
        assert!(matches!(check_ingestion(&fields, &two), Err(VizierError::InvalidRecord(_))));
    }
}

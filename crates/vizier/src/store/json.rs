//! JSON files on disk, one directory per dataset.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    PropertyStore, apply_override, check_dataset_id, check_ingestion, replace_fields, sync_dataset_type,
};
use crate::error::{Result, VizierError};
use crate::schema::{DatasetProperties, FieldProperties, FieldType};

const FIELDS_FILE: &str = "fields.json";
const DATASET_FILE: &str = "dataset.json";
const LOCK_FILE: &str = ".lock";

/// Default age after which a leftover lock file is considered abandoned.
pub const DEFAULT_STALE_LOCK_AFTER: Duration = Duration::from_secs(300);

/// Property store writing pretty-printed JSON under a root directory.
///
/// ```text
/// <root>/<dataset_id>/fields.json
/// <root>/<dataset_id>/dataset.json
/// ```
///
/// Writes to a dataset hold an exclusive `.lock` file in its directory. A
/// second writer finding the lock gets [`VizierError::PersistenceConflict`].
///
/// The lock file records the writer's process id. A process that dies while
/// writing leaves the file behind; once it is older than the stale-lock age
/// (see [`JsonStore::with_stale_lock_after`]) the next writer removes it.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
    stale_lock_after: Duration,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stale_lock_after: DEFAULT_STALE_LOCK_AFTER,
        }
    }

    /// Set the age after which a leftover lock file is broken.
    pub fn with_stale_lock_after(mut self, age: Duration) -> Self {
        self.stale_lock_after = age;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, dataset_id: &str) -> Result<PathBuf> {
        check_dataset_id(dataset_id)?;
        Ok(self.root.join(dataset_id))
    }

    fn lock(&self, dataset_id: &str) -> Result<WriteLock> {
        let dir = self.dataset_dir(dataset_id)?;
        fs::create_dir_all(&dir).map_err(|e| {
            VizierError::Persistence(format!("Failed to create directory '{}': {}", dir.display(), e))
        })?;
        let path = dir.join(LOCK_FILE);

        match WriteLock::acquire(&path, dataset_id) {
            Err(VizierError::PersistenceConflict { .. }) if self.is_stale(&path) => {
                warn!(path = %path.display(), holder = %lock_holder(&path), "breaking stale lock");
                fs::remove_file(&path).map_err(|e| {
                    VizierError::Persistence(format!("Failed to remove stale lock '{}': {}", path.display(), e))
                })?;
                WriteLock::acquire(&path, dataset_id)
            }
            other => other,
        }
    }

    fn is_stale(&self, lock: &Path) -> bool {
        fs::metadata(lock)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age >= self.stale_lock_after)
    }
}

/// Held for the duration of one write; the lock file is removed on drop.
struct WriteLock {
    path: PathBuf,
}

impl WriteLock {
    fn acquire(path: &Path, dataset_id: &str) -> Result<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                let lock = Self { path: path.to_path_buf() };
                if let Err(e) = writeln!(file, "{}", std::process::id()) {
                    debug!(path = %path.display(), error = %e, "failed to record lock holder");
                }
                Ok(lock)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(VizierError::PersistenceConflict {
                dataset_id: dataset_id.to_string(),
            }),
            Err(e) => Err(VizierError::Persistence(format!(
                "Failed to create lock '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "failed to remove lock file");
        }
    }
}

fn lock_holder(path: &Path) -> String {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(VizierError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            )));
        }
    };

    Ok(Some(serde_json::from_reader(BufReader::new(file))?))
}

/// Serialize into a sibling temp file and return its path.
fn write_tmp<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let tmp = path.with_extension("json.tmp");
    let file = File::create(&tmp).map_err(|e| {
        VizierError::Persistence(format!("Failed to create file '{}': {}", tmp.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .flush()
        .map_err(|e| VizierError::Persistence(format!("Failed to write '{}': {}", tmp.display(), e)))?;
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp, path).map_err(|e| {
        let _ = fs::remove_file(tmp);
        VizierError::Persistence(format!("Failed to replace '{}': {}", path.display(), e))
    })
}

/// Write through a sibling temp file so readers never see a partial document.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let tmp = write_tmp(path, value)?;
    commit(&tmp, path)
}

impl PropertyStore for JsonStore {
    fn save_field_properties(&self, dataset_id: &str, fields: &[FieldProperties]) -> Result<()> {
        for field in fields {
            field.validate()?;
        }
        let _lock = self.lock(dataset_id)?;
        let path = self.dataset_dir(dataset_id)?.join(FIELDS_FILE);

        let stored: Vec<FieldProperties> = read_json(&path)?.unwrap_or_default();
        let replaced = replace_fields(&stored, fields)?;
        write_json(&path, &replaced)?;
        debug!(dataset_id, fields = replaced.len(), "saved field properties");
        Ok(())
    }

    fn save_dataset_properties(&self, dataset_id: &str, dataset: &DatasetProperties) -> Result<()> {
        dataset.validate()?;
        let _lock = self.lock(dataset_id)?;
        let path = self.dataset_dir(dataset_id)?.join(DATASET_FILE);
        write_json(&path, dataset)?;
        debug!(dataset_id, "saved dataset properties");
        Ok(())
    }

    fn field_properties(&self, dataset_id: &str) -> Result<Vec<FieldProperties>> {
        let path = self.dataset_dir(dataset_id)?.join(FIELDS_FILE);
        Ok(read_json(&path)?.unwrap_or_default())
    }

    fn dataset_properties(&self, dataset_id: &str) -> Result<Option<DatasetProperties>> {
        let path = self.dataset_dir(dataset_id)?.join(DATASET_FILE);
        read_json(&path)
    }

    fn save_ingestion(
        &self,
        dataset_id: &str,
        fields: &[FieldProperties],
        dataset: &DatasetProperties,
    ) -> Result<()> {
        check_ingestion(fields, dataset)?;
        for field in fields {
            field.validate()?;
        }

        let _lock = self.lock(dataset_id)?;
        let dir = self.dataset_dir(dataset_id)?;
        let (fields_path, dataset_path) = (dir.join(FIELDS_FILE), dir.join(DATASET_FILE));

        let previous: Option<Vec<FieldProperties>> = read_json(&fields_path)?;
        let replaced = replace_fields(previous.as_deref().unwrap_or_default(), fields)?;
        let mut dataset = dataset.clone();
        for field in replaced.iter().filter(|f| f.manual) {
            sync_dataset_type(&mut dataset, field);
        }

        let fields_tmp = write_tmp(&fields_path, &replaced)?;
        let dataset_tmp = match write_tmp(&dataset_path, &dataset) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&fields_tmp);
                return Err(e);
            }
        };

        if let Err(e) = commit(&fields_tmp, &fields_path) {
            let _ = fs::remove_file(&dataset_tmp);
            return Err(e);
        }
        if let Err(e) = commit(&dataset_tmp, &dataset_path) {
            let restored = match &previous {
                Some(fields) => write_json(&fields_path, fields),
                None => fs::remove_file(&fields_path).map_err(|e| {
                    VizierError::Persistence(format!("Failed to remove '{}': {}", fields_path.display(), e))
                }),
            };
            if let Err(restore) = restored {
                warn!(dataset_id, error = %restore, "failed to restore field properties");
            }
            return Err(e);
        }

        debug!(dataset_id, fields = replaced.len(), "saved ingestion");
        Ok(())
    }

    fn override_field_type(&self, dataset_id: &str, name: &str, field_type: FieldType) -> Result<FieldProperties> {
        let dir = self.dataset_dir(dataset_id)?;
        let (fields_path, dataset_path) = (dir.join(FIELDS_FILE), dir.join(DATASET_FILE));
        if !fields_path.exists() {
            return Err(VizierError::UnknownColumn(name.to_string()));
        }

        let _lock = self.lock(dataset_id)?;
        let mut fields: Vec<FieldProperties> = read_json(&fields_path)?.unwrap_or_default();
        let updated = apply_override(&mut fields, name, field_type)?;
        write_json(&fields_path, &fields)?;

        if let Some(mut dataset) = read_json::<DatasetProperties>(&dataset_path)? {
            sync_dataset_type(&mut dataset, &updated);
            write_json(&dataset_path, &dataset)?;
        }
        Ok(updated)
    }
}

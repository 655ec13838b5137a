use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rmz_core::RecordId;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::StoreError,
    traits::{RecordFile, RecordStore},
};

/// Record store over an RPG Maker `data/` directory.
///
/// Every overwrite first copies the previous file to `<file>.bak`.
pub struct JsonRecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = data_dir.into();
        if !root.is_dir() {
            return Err(StoreError::MissingDataDir(root));
        }
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file: &RecordFile) -> PathBuf {
        self.root.join(file.file_name())
    }

    fn load(&self, path: &Path) -> Result<Value, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Value::Null),
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed { path: path.to_path_buf(), source })
    }

    fn save(&self, path: &Path, value: &Value) -> Result<(), StoreError> {
        if path.exists() {
            let mut bak = path.as_os_str().to_owned();
            bak.push(".bak");
            if let Err(e) = std::fs::copy(path, &bak) {
                warn!(path = %path.display(), error = %e, "backup failed, writing anyway");
            }
        }
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Malformed { path: path.to_path_buf(), source })?;
        std::fs::write(path, bytes).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        debug!(path = %path.display(), "record file written");
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn read(&self, file: &RecordFile) -> Result<Option<Value>, StoreError> {
        match self.load(&self.path_of(file))? {
            Value::Null => Ok(None),
            v => Ok(Some(v)),
        }
    }

    fn update(
        &self,
        file: &RecordFile,
        edit: &mut dyn FnMut(&mut Value) -> Result<RecordId, StoreError>,
    ) -> Result<RecordId, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.path_of(file);
        let mut value = self.load(&path)?;
        let id = edit(&mut value)?;
        self.save(&path, &value)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_requires_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("data");
        assert!(matches!(JsonRecordStore::open(&missing), Err(StoreError::MissingDataDir(_))));
    }

    #[test]
    fn update_writes_backup_of_previous_version() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::open(dir.path()).unwrap();
        let file = RecordFile::Actors;
        store.update(&file, &mut |v| {
            *v = serde_json::json!([null]);
            Ok(0)
        })
        .unwrap();
        assert!(!dir.path().join("Actors.json.bak").exists());

        store.update(&file, &mut |v| {
            *v = serde_json::json!([null, {"id": 1}]);
            Ok(1)
        })
        .unwrap();
        let bak = std::fs::read_to_string(dir.path().join("Actors.json.bak")).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&bak).unwrap(), serde_json::json!([null]));
    }

    #[test]
    fn failed_edit_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonRecordStore::open(dir.path()).unwrap();
        let err = store.update(&RecordFile::Skills, &mut |_| Err(StoreError::MapNotFound(3)));
        assert!(err.is_err());
        assert!(!dir.path().join("Skills.json").exists());
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use rmz_core::RecordId;
use serde_json::Value;

use crate::{
    error::{Family, StoreError},
    traits::{RecordFile, RecordStore},
};

/// In-memory record store for tests and dry runs. Families can be marked
/// unavailable to simulate a broken data directory.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, Value>,
    unavailable: BTreeSet<Family>,
    writes: usize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later read or write of `family` fails with `StoreError::Unavailable`.
    pub fn fail_family(&self, family: Family) {
        self.lock().unavailable.insert(family);
    }

    pub fn restore_family(&self, family: Family) {
        self.lock().unavailable.remove(&family);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn check(&self, file: &RecordFile) -> Result<(), StoreError> {
        let family = file.family();
        if self.unavailable.contains(&family) {
            return Err(StoreError::Unavailable(family));
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn read(&self, file: &RecordFile) -> Result<Option<Value>, StoreError> {
        let inner = self.lock();
        inner.check(file)?;
        Ok(inner.files.get(&file.file_name()).cloned())
    }

    fn update(
        &self,
        file: &RecordFile,
        edit: &mut dyn FnMut(&mut Value) -> Result<RecordId, StoreError>,
    ) -> Result<RecordId, StoreError> {
        let mut inner = self.lock();
        inner.check(file)?;
        let key = file.file_name();
        let mut value = inner.files.get(&key).cloned().unwrap_or(Value::Null);
        let id = edit(&mut value)?;
        inner.files.insert(key, value);
        inner.writes += 1;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_family_fails_reads_and_writes() {
        let store = InMemoryRecordStore::new();
        store.fail_family(Family::Skills);
        assert!(matches!(store.read(&RecordFile::Skills), Err(StoreError::Unavailable(Family::Skills))));
        assert!(store.create_class("Knight").is_ok());
        assert_eq!(store.writes(), 1);

        store.restore_family(Family::Skills);
        assert_eq!(store.read(&RecordFile::Skills).unwrap(), None);
    }
}

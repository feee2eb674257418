use std::sync::Arc;

use crate::catalog::{Catalog, UniversityId};
use crate::store::{AppStore, MemoryStorage, StateStorage, StorageError};

pub(crate) fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().expect("builtin catalog loads"))
}

pub(crate) fn store() -> AppStore {
    AppStore::in_memory(catalog())
}

/// Store over a shared backend so a second store can observe what the first persisted.
pub(crate) fn store_on(storage: &MemoryStorage) -> AppStore {
    AppStore::new(catalog(), Arc::new(storage.clone()))
}

pub(crate) fn id(value: &str) -> UniversityId {
    UniversityId::new(value)
}

pub(crate) struct ReadOnlyStorage;

impl StateStorage for ReadOnlyStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".to_string()))
    }
}

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub const PROFILE_KEY: &str = "euAdmit.profile";
pub const APPLICATIONS_KEY: &str = "euAdmit.applications";
pub const WIZARD_DRAFT_KEY: &str = "euAdmit.wizardDraft";

/// String key/value persistence behind the app store.
pub trait StateStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Process-local storage; the default when no data directory is configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage poisoned".to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_error)?;
        fs::write(self.path_for(key), value).map_err(io_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Read and decode `key`. Unreadable or corrupt entries are logged and treated as absent.
pub(crate) fn load_json<T: DeserializeOwned>(storage: &dyn StateStorage, key: &str) -> Option<T> {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding corrupt stored state");
            None
        }
    }
}

pub(crate) fn save_json<T: Serialize + ?Sized>(
    storage: &dyn StateStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.write(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_entry_loads_as_absent() {
        let storage = MemoryStorage::new();
        storage.write(PROFILE_KEY, "{not json").expect("write");
        let loaded: Option<Vec<u32>> = load_json(&storage, PROFILE_KEY);
        assert!(loaded.is_none());
    }

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = std::env::temp_dir().join(format!("eu-admit-storage-{}", std::process::id()));
        let storage = FileStorage::new(&dir);

        assert_eq!(storage.read(APPLICATIONS_KEY).expect("read"), None);
        save_json(&storage, APPLICATIONS_KEY, &vec![1, 2, 3]).expect("save");
        assert!(dir.join("euAdmit.applications.json").exists());

        let loaded: Option<Vec<u32>> = load_json(&storage, APPLICATIONS_KEY);
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        storage.remove(APPLICATIONS_KEY).expect("remove");
        storage.remove(APPLICATIONS_KEY).expect("second remove is a no-op");
        assert_eq!(storage.read(APPLICATIONS_KEY).expect("read"), None);

        let _ = fs::remove_dir_all(&dir);
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw string-keyed storage backend.
///
/// Implementors store opaque string values; JSON encoding and failure
/// masking live one layer up in `KvStore`.
pub trait Storage: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_raw(&self, key: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed storage: one file per key under a directory.
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FsStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory storage backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("panelcache-test-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_fs_storage_round_trip() {
        let dir = temp_storage_dir("fs-round-trip");
        let storage = FsStorage::new(dir.clone()).expect("Failed to create storage");

        assert!(storage.get_raw("missing").unwrap().is_none());

        storage.set_raw("greeting", "\"hello\"").unwrap();
        assert_eq!(storage.get_raw("greeting").unwrap().as_deref(), Some("\"hello\""));

        storage.remove_raw("greeting").unwrap();
        assert!(storage.get_raw("greeting").unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        storage.set_raw("k", "v").unwrap();
        assert_eq!(storage.get_raw("k").unwrap().as_deref(), Some("v"));
        storage.remove_raw("k").unwrap();
        assert!(storage.get_raw("k").unwrap().is_none());
    }
}

//! Named, versioned request-cache namespaces.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::storage::StorageError;

use super::request::StoredResponse;

/// Name-addressed store of request->response entries.
///
/// Entries are written and replaced wholesale, so concurrent writers for
/// the same key race benignly: last write wins.
pub trait RequestCache: Send + Sync {
    fn put(&self, namespace: &str, key: &str, response: &StoredResponse)
        -> Result<(), StorageError>;

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StorageError>;

    /// All namespace names currently present.
    fn namespaces(&self) -> Result<Vec<String>, StorageError>;

    /// Delete a namespace and everything in it.
    fn delete_namespace(&self, name: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed request cache: a directory per namespace, a JSON file
/// per entry. Entry keys are request-identity hashes, so they are safe as
/// file names.
pub struct FsRequestCache {
    root: PathBuf,
}

impl FsRequestCache {
    pub fn new(root: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(namespace).join(format!("{}.json", key))
    }
}

impl RequestCache for FsRequestCache {
    fn put(
        &self,
        namespace: &str,
        key: &str,
        response: &StoredResponse,
    ) -> Result<(), StorageError> {
        let path = self.entry_path(namespace, key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(response)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StorageError> {
        let path = self.entry_path(namespace, key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_namespace(&self, name: &str) -> Result<(), StorageError> {
        let path = self.root.join(name);
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        Ok(())
    }
}

/// In-memory request cache for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryRequestCache {
    namespaces: Mutex<HashMap<String, HashMap<String, StoredResponse>>>,
}

impl MemoryRequestCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestCache for MemoryRequestCache {
    fn put(
        &self,
        namespace: &str,
        key: &str,
        response: &StoredResponse,
    ) -> Result<(), StorageError> {
        let mut namespaces = self
            .namespaces
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, StorageError> {
        let namespaces = self
            .namespaces
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(namespaces.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let namespaces = self
            .namespaces
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut names: Vec<String> = namespaces.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete_namespace(&self, name: &str) -> Result<(), StorageError> {
        let mut namespaces = self
            .namespaces
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        namespaces.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &[u8]) -> StoredResponse {
        StoredResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryRequestCache::new();
        let stored = response(b"{\"anime_list\":[]}");

        cache.put("shell-v1", "abc", &stored).unwrap();
        assert_eq!(cache.get("shell-v1", "abc").unwrap(), Some(stored));
        assert_eq!(cache.get("shell-v1", "missing").unwrap(), None);
        assert_eq!(cache.get("shell-v2", "abc").unwrap(), None);
    }

    #[test]
    fn test_memory_cache_namespace_listing_and_deletion() {
        let cache = MemoryRequestCache::new();
        cache.put("shell-v1", "a", &response(b"1")).unwrap();
        cache.put("shell-v2", "b", &response(b"2")).unwrap();

        assert_eq!(cache.namespaces().unwrap(), vec!["shell-v1", "shell-v2"]);

        cache.delete_namespace("shell-v1").unwrap();
        assert_eq!(cache.namespaces().unwrap(), vec!["shell-v2"]);
        assert_eq!(cache.get("shell-v1", "a").unwrap(), None);
    }

    #[test]
    fn test_fs_cache_round_trip() {
        let root = std::env::temp_dir().join(format!(
            "panelcache-test-reqcache-{}",
            std::process::id()
        ));
        let cache = FsRequestCache::new(root.clone()).expect("Failed to create cache");
        let stored = response(b"body bytes");

        cache.put("shell-v1", "deadbeef", &stored).unwrap();
        assert_eq!(cache.get("shell-v1", "deadbeef").unwrap(), Some(stored));
        assert_eq!(cache.namespaces().unwrap(), vec!["shell-v1"]);

        cache.delete_namespace("shell-v1").unwrap();
        assert!(cache.namespaces().unwrap().is_empty());

        let _ = std::fs::remove_dir_all(root);
    }
}

//! In-process object store

use super::{ObjectStore, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Object store that keeps everything in a map.
///
/// Used by the test suites and for running the server without S3. An
/// [`unavailable`](MemoryStore::unavailable) store rejects every operation,
/// which lets callers exercise storage outage paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with a backend error
    pub fn unavailable() -> Self {
        Self {
            objects: Mutex::default(),
            unavailable: true,
        }
    }

    /// Snapshot of an object, if present
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Backend("memory store is unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.check_available()?;
        self.objects
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))?
            .insert(key.to_string(), data);
        Ok(format!("memory://{}", key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.check_available()?;
        self.objects
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_overwrites() {
        let store = MemoryStore::new();
        let location = store.put("a/b.csv", b"one".to_vec(), "text/csv").await.unwrap();
        assert_eq!(location, "memory://a/b.csv");

        store.put("a/b.csv", b"two".to_vec(), "text/csv").await.unwrap();
        assert_eq!(store.get("a/b.csv").await.unwrap(), b"two");
        assert_eq!(store.keys(), vec!["a/b.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(key) if key == "nope"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = MemoryStore::unavailable();
        assert!(matches!(
            store.put("k", vec![], "text/csv").await,
            Err(StorageError::Backend(_))
        ));
        assert!(matches!(store.get("k").await, Err(StorageError::Backend(_))));
    }
}

//! In-memory fingerprint store for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::{FingerprintStore, RevisionKey};

/// Process-local store. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulate a backend outage: every call fails with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::storage("memory store marked unavailable"));
        }
        self.records
            .lock()
            .map_err(|e| AppError::storage(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl FingerprintStore for MemoryStore {
    async fn exists(&self, key: &RevisionKey) -> Result<bool> {
        Ok(self.lock()?.contains_key(key.as_str()))
    }

    async fn read(&self, key: &RevisionKey) -> Result<Option<String>> {
        Ok(self.lock()?.get(key.as_str()).cloned())
    }

    async fn write(&self, key: &RevisionKey, value: &str) -> Result<()> {
        self.lock()?
            .insert(key.as_str().to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_records() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let key = RevisionKey::website("https://example.com", "body");

        store.write(&key, "text").await.unwrap();
        assert!(clone.exists(&key).await.unwrap());
        assert_eq!(clone.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_not_found() {
        let store = MemoryStore::new();
        let key = RevisionKey::website("https://example.com", "body");
        store.set_unavailable(true);

        assert!(matches!(store.read(&key).await, Err(AppError::Storage(_))));
        assert!(matches!(store.exists(&key).await, Err(AppError::Storage(_))));
    }
}

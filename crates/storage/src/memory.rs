//! In-memory byte store.
//!
//! Bytes are copied on save and on load: the store is the sole owner of
//! resting bytes, and every load returns an independent copy.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tessera_core::{StorageKey, StoreError};
use tracing::trace;

use crate::traits::{AsyncByteStore, ByteStore};

/// HashMap-backed store.
///
/// Keys are sanitized exactly as the file store sanitizes them, so a key
/// addresses the same record on either backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no records are stored
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ByteStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let key = StorageKey::sanitize(key)?;
        Ok(self.records.read().contains_key(&key))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let key = StorageKey::sanitize(key)?;
        Ok(self.records.write().remove(&key).is_some())
    }

    fn save_raw(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let key = StorageKey::sanitize(key)?;
        trace!(key = %key, len = bytes.len(), "memory save");
        self.records.write().insert(key, bytes.to_vec());
        Ok(())
    }

    fn load_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let key = StorageKey::sanitize(key)?;
        Ok(self.records.read().get(&key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.records.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    fn store_id(&self) -> &str {
        "memory"
    }
}

// No I/O to wait on: the async surface completes immediately.
#[async_trait]
impl AsyncByteStore for MemoryStore {
    async fn exists_async(&self, key: &str) -> Result<bool, StoreError> {
        self.exists(key)
    }

    async fn delete_async(&self, key: &str) -> Result<bool, StoreError> {
        self.delete(key)
    }

    async fn save_raw_async(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.save_raw(key, bytes)
    }

    async fn load_raw_async(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.load_raw(key)
    }
}

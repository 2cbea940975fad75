//! Byte store trait definitions.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::StoreError;

/// Raw key → byte-sequence storage.
///
/// Any backend satisfying this contract plugs into the persistence manager.
///
/// # Guarantees
///
/// - A single `save_raw` is atomic from the caller's perspective: no partial
///   record is ever observable.
/// - Loading an absent key returns `Ok(None)`, never an error.
/// - I/O failures propagate to the caller; implementations do not retry.
///
/// # Thread Safety
///
/// Stores must be `Send + Sync` so one instance can serve concurrent callers.
pub trait ByteStore: Send + Sync {
    /// True if a record exists for `key`.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove the record for `key`. Returns false if there was none.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Store `bytes` under `key`, replacing any previous record.
    fn save_raw(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Load the record for `key`, or `None` if absent.
    fn load_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove every record. Returns the number removed.
    fn clear(&self) -> Result<usize, StoreError>;

    /// Unique store identifier (used in logs).
    fn store_id(&self) -> &str;
}

/// Async counterpart of [`ByteStore`].
///
/// Semantics are identical to the sync surface; only the waiting differs.
/// No cancellation signal is accepted: callers needing cancellation must
/// cancel the underlying I/O themselves.
#[async_trait]
pub trait AsyncByteStore: Send + Sync {
    /// Async [`ByteStore::exists`].
    async fn exists_async(&self, key: &str) -> Result<bool, StoreError>;

    /// Async [`ByteStore::delete`].
    async fn delete_async(&self, key: &str) -> Result<bool, StoreError>;

    /// Async [`ByteStore::save_raw`].
    async fn save_raw_async(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Async [`ByteStore::load_raw`].
    async fn load_raw_async(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

// Shared stores: several managers (or a manager and a test) over one backend.
impl<T: ByteStore + ?Sized> ByteStore for Arc<T> {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn save_raw(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).save_raw(key, bytes)
    }

    fn load_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load_raw(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }

    fn clear(&self) -> Result<usize, StoreError> {
        (**self).clear()
    }

    fn store_id(&self) -> &str {
        (**self).store_id()
    }
}

#[async_trait]
impl<T: AsyncByteStore + ?Sized> AsyncByteStore for Arc<T> {
    async fn exists_async(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists_async(key).await
    }

    async fn delete_async(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete_async(key).await
    }

    async fn save_raw_async(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).save_raw_async(key, bytes).await
    }

    async fn load_raw_async(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load_raw_async(key).await
    }
}

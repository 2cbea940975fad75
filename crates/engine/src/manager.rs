//! Persistence manager: the save/load/exists/delete surface
//!
//! Every call is a fresh traversal of the pipeline:
//!
//! ```text
//! save:  value ─serialize─▶ payload ─digest─▶ Envelope ─encode─▶ bytes ─encrypt─▶ store.save_raw
//!
//! load:  store.load_raw ─▶ absent? → None
//!                       ─decrypt─▶ bytes ─decode─▶ Envelope ─verify digest─▶
//!                       ├─ version < current → migrate ─▶ deserialize ─▶ re-save ─▶ value
//!                       └─ otherwise         ───────────▶ deserialize ─────────────▶ value
//! ```
//!
//! The sync and async surfaces share the pure `seal` (value → record) and
//! `open` (record → value) stages; only the store call differs.

use std::sync::Arc;

use tessera_core::{
    Envelope, JsonCodec, PayloadCodec, PersistError, PersistResult, Persistable,
    PersistenceFailure,
};
use tessera_security::{Cipher, HashValidator, IdentityCipher, Validator};
use tessera_storage::{AsyncByteStore, ByteStore};
use tracing::{debug, info, warn};

use crate::migration::MigrationManager;

/// Type tag reported for records too damaged to name their own type
const UNKNOWN_TYPE_TAG: &str = "<unknown>";

/// Pipeline switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Compute digests on save and verify them on load
    pub validation: bool,
    /// Run migrators when a stored record is older than its type
    pub versioning: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            validation: true,
            versioning: true,
        }
    }
}

/// Envelope metadata of a stored record, read without deserializing the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeInfo {
    /// Schema version recorded in the envelope
    pub schema_version: u32,
    /// Type tag recorded in the envelope
    pub type_tag: String,
    /// Creation time in epoch milliseconds
    pub created_at: u64,
    /// Serialized payload length in bytes
    pub payload_len: usize,
    /// Whether a digest was stored
    pub has_digest: bool,
    /// Size of the stored record (after encryption)
    pub record_len: usize,
}

/// Outcome of opening a stored record
enum Opened<T> {
    /// Stored at (or above) the current schema version
    Current(T),
    /// Migrated up from an older version; must be re-saved
    Migrated { value: T, from: u32 },
}

/// Orchestrates serializer, validator, cipher, migrations and byte store.
///
/// Constructed explicitly and passed to its consumers; there is no global
/// default instance.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tessera_core::Persistable;
/// use tessera_engine::PersistenceManager;
/// use tessera_storage::MemoryStore;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Player { name: String, hp: u32 }
///
/// impl Persistable for Player {
///     const TYPE_TAG: &'static str = "player";
/// }
///
/// let manager = PersistenceManager::new(MemoryStore::new());
/// let hero = Player { name: "Hero".into(), hp: 100 };
///
/// manager.save_with_key("p1", &hero).unwrap();
/// assert_eq!(manager.load_with_key::<Player>("p1").unwrap(), Some(hero));
///
/// assert!(manager.delete_with_key("p1").unwrap());
/// assert!(!manager.exists_with_key("p1").unwrap());
/// ```
pub struct PersistenceManager<S, C = JsonCodec> {
    store: S,
    codec: C,
    cipher: Box<dyn Cipher>,
    validator: Box<dyn Validator>,
    migrations: Arc<MigrationManager>,
    options: PipelineOptions,
}

impl<S: ByteStore> PersistenceManager<S, JsonCodec> {
    /// Create a manager over `store` with JSON payloads, SHA-256 validation,
    /// no encryption, versioning enabled and an empty migration registry.
    pub fn new(store: S) -> Self {
        PersistenceManager {
            store,
            codec: JsonCodec::new(),
            cipher: Box::new(IdentityCipher),
            validator: Box::new(HashValidator),
            migrations: Arc::new(MigrationManager::new()),
            options: PipelineOptions::default(),
        }
    }
}

impl<S, C> PersistenceManager<S, C> {
    /// Replace the cipher
    pub fn with_cipher(mut self, cipher: Box<dyn Cipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Replace the validator
    pub fn with_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    /// Share a migration registry
    pub fn with_migrations(mut self, migrations: Arc<MigrationManager>) -> Self {
        self.migrations = migrations;
        self
    }

    /// Enable or disable digest computation and verification
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.options.validation = enabled;
        self
    }

    /// Enable or disable migration on load
    pub fn with_versioning(mut self, enabled: bool) -> Self {
        self.options.versioning = enabled;
        self
    }

    /// Replace the payload codec
    pub fn with_codec<C2: PayloadCodec>(self, codec: C2) -> PersistenceManager<S, C2> {
        PersistenceManager {
            store: self.store,
            codec,
            cipher: self.cipher,
            validator: self.validator,
            migrations: self.migrations,
            options: self.options,
        }
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Migration registry (register migrators through this)
    pub fn migrations(&self) -> &MigrationManager {
        &self.migrations
    }

    /// Shared handle to the migration registry
    pub fn migrations_handle(&self) -> Arc<MigrationManager> {
        Arc::clone(&self.migrations)
    }

    /// Pipeline switches in effect
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Identifier of the cipher in use
    pub fn cipher_id(&self) -> &str {
        self.cipher.cipher_id()
    }

    /// Identifier of the validator in use
    pub fn validator_id(&self) -> &str {
        self.validator.validator_id()
    }
}

// Pure stages shared by the sync and async surfaces.
impl<S, C: PayloadCodec> PersistenceManager<S, C> {
    /// Value → stored record: serialize, digest, wrap, encode, encrypt.
    fn seal<T: Persistable>(&self, value: &T) -> PersistResult<Vec<u8>> {
        let payload = self.codec.serialize(value)?.into_bytes();

        let digest = if self.options.validation {
            let digest = self.validator.compute_digest(&payload);
            (!digest.is_empty()).then_some(digest)
        } else {
            None
        };

        let envelope = Envelope::new(T::SCHEMA_VERSION, T::TYPE_TAG, payload, digest);
        let encoded = envelope.encode()?;
        Ok(self.cipher.encrypt(&encoded)?)
    }

    /// Stored record → verified envelope: decrypt, decode, verify digest.
    ///
    /// With validation on, a record that decrypts but does not decode is
    /// present but untrusted, and is reported as a validation failure.
    fn unwrap_record(&self, key: &str, record: &[u8]) -> PersistResult<Envelope> {
        let decrypted = self.cipher.decrypt(record)?;
        let envelope = match Envelope::decode(&decrypted) {
            Ok(envelope) => envelope,
            Err(e) if self.options.validation => {
                warn!(key, error = %e, "undecodable record, refusing to load");
                return Err(PersistError::validation(key, UNKNOWN_TYPE_TAG, e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if self.options.validation {
            if let Some(digest) = &envelope.digest {
                if !self.validator.verify(&envelope.payload, digest) {
                    warn!(
                        key,
                        type_tag = %envelope.type_tag,
                        validator = self.validator.validator_id(),
                        "digest mismatch, refusing to load record"
                    );
                    return Err(PersistError::validation(
                        key,
                        envelope.type_tag.as_str(),
                        format!("{} digest mismatch", self.validator.validator_id()),
                    ));
                }
            }
        }
        Ok(envelope)
    }

    /// Stored record → value, migrating when the record is older than `T`.
    fn open<T: Persistable>(&self, key: &str, record: &[u8]) -> PersistResult<Opened<T>> {
        let envelope = self.unwrap_record(key, record)?;

        if envelope.type_tag != T::TYPE_TAG {
            return Err(PersistenceFailure::TypeMismatch {
                expected: T::TYPE_TAG.to_string(),
                found: envelope.type_tag,
            }
            .into());
        }

        let stored = envelope.schema_version;
        let current = T::SCHEMA_VERSION;
        let text = envelope.payload_text()?;

        if self.options.versioning && stored < current {
            let migrated = self.migrations.migrate(T::TYPE_TAG, text, stored, current)?;
            let value = self.codec.deserialize(&migrated)?;
            return Ok(Opened::Migrated {
                value,
                from: stored,
            });
        }

        if stored > current {
            warn!(
                key,
                type_tag = T::TYPE_TAG,
                stored,
                current,
                "record written by a newer schema version"
            );
        }
        Ok(Opened::Current(self.codec.deserialize(text)?))
    }

    fn info(&self, key: &str, record: &[u8]) -> PersistResult<EnvelopeInfo> {
        let envelope = self.unwrap_record(key, record)?;
        Ok(EnvelopeInfo {
            schema_version: envelope.schema_version,
            type_tag: envelope.type_tag,
            created_at: envelope.created_at,
            payload_len: envelope.payload.len(),
            has_digest: envelope.digest.is_some(),
            record_len: record.len(),
        })
    }
}

impl<S: ByteStore, C: PayloadCodec> PersistenceManager<S, C> {
    /// Save `value` under its type's default key.
    pub fn save<T: Persistable>(&self, value: &T) -> PersistResult<()> {
        self.save_with_key(T::TYPE_TAG, value)
    }

    /// Save `value` under `key`, replacing any previous record.
    pub fn save_with_key<T: Persistable>(&self, key: &str, value: &T) -> PersistResult<()> {
        let record = self.seal(value)?;
        self.store.save_raw(key, &record)?;
        debug!(
            key,
            type_tag = T::TYPE_TAG,
            version = T::SCHEMA_VERSION,
            len = record.len(),
            "saved record"
        );
        Ok(())
    }

    /// Load the record at `T`'s default key.
    pub fn load<T: Persistable>(&self) -> PersistResult<Option<T>> {
        self.load_with_key(T::TYPE_TAG)
    }

    /// Load the record at `key`.
    ///
    /// Returns `Ok(None)` if no record exists. A record older than `T`'s
    /// schema version is migrated, re-saved under `key`, and returned.
    pub fn load_with_key<T: Persistable>(&self, key: &str) -> PersistResult<Option<T>> {
        let Some(record) = self.store.load_raw(key)? else {
            debug!(key, type_tag = T::TYPE_TAG, "no record");
            return Ok(None);
        };

        match self.open::<T>(key, &record)? {
            Opened::Current(value) => {
                debug!(key, type_tag = T::TYPE_TAG, "loaded record");
                Ok(Some(value))
            }
            Opened::Migrated { value, from } => {
                self.save_with_key(key, &value)?;
                info!(
                    key,
                    type_tag = T::TYPE_TAG,
                    from,
                    to = T::SCHEMA_VERSION,
                    "migrated record re-saved"
                );
                Ok(Some(value))
            }
        }
    }

    /// Load `T` from its default key, or `T::default()` if absent.
    ///
    /// Only absence is replaced; every failure kind still propagates.
    pub fn load_or_default<T: Persistable + Default>(&self) -> PersistResult<T> {
        self.load_or_default_with_key(T::TYPE_TAG)
    }

    /// Load `T` from `key`, or `T::default()` if absent.
    pub fn load_or_default_with_key<T: Persistable + Default>(&self, key: &str) -> PersistResult<T> {
        Ok(self.load_with_key(key)?.unwrap_or_default())
    }

    /// Load `T` from `key`, or `default` if absent.
    pub fn load_or_with_key<T: Persistable>(&self, key: &str, default: T) -> PersistResult<T> {
        Ok(self.load_with_key(key)?.unwrap_or(default))
    }

    /// True if a record exists at `T`'s default key.
    pub fn exists<T: Persistable>(&self) -> PersistResult<bool> {
        self.exists_with_key(T::TYPE_TAG)
    }

    /// True if a record exists at `key`.
    pub fn exists_with_key(&self, key: &str) -> PersistResult<bool> {
        Ok(self.store.exists(key)?)
    }

    /// Delete the record at `T`'s default key. Returns false if there was none.
    pub fn delete<T: Persistable>(&self) -> PersistResult<bool> {
        self.delete_with_key(T::TYPE_TAG)
    }

    /// Delete the record at `key`. Returns false if there was none.
    pub fn delete_with_key(&self, key: &str) -> PersistResult<bool> {
        let deleted = self.store.delete(key)?;
        debug!(key, deleted, "delete");
        Ok(deleted)
    }

    /// All stored keys (as sanitized by the store), sorted.
    pub fn keys(&self) -> PersistResult<Vec<String>> {
        Ok(self.store.keys()?)
    }

    /// Envelope metadata of the record at `key`, without deserializing it.
    ///
    /// Decrypts, decodes and verifies the digest exactly as a load would.
    pub fn inspect(&self, key: &str) -> PersistResult<Option<EnvelopeInfo>> {
        match self.store.load_raw(key)? {
            Some(record) => Ok(Some(self.info(key, &record)?)),
            None => Ok(None),
        }
    }
}

impl<S: AsyncByteStore, C: PayloadCodec> PersistenceManager<S, C> {
    /// Async [`save`](Self::save).
    pub async fn save_async<T: Persistable + Sync>(&self, value: &T) -> PersistResult<()> {
        self.save_with_key_async(T::TYPE_TAG, value).await
    }

    /// Async [`save_with_key`](Self::save_with_key).
    pub async fn save_with_key_async<T: Persistable + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> PersistResult<()> {
        let record = self.seal(value)?;
        self.store.save_raw_async(key, &record).await?;
        debug!(key, type_tag = T::TYPE_TAG, len = record.len(), "saved record");
        Ok(())
    }

    /// Async [`load`](Self::load).
    pub async fn load_async<T: Persistable + Send + Sync>(&self) -> PersistResult<Option<T>> {
        self.load_with_key_async(T::TYPE_TAG).await
    }

    /// Async [`load_with_key`](Self::load_with_key).
    pub async fn load_with_key_async<T: Persistable + Send + Sync>(
        &self,
        key: &str,
    ) -> PersistResult<Option<T>> {
        let Some(record) = self.store.load_raw_async(key).await? else {
            debug!(key, type_tag = T::TYPE_TAG, "no record");
            return Ok(None);
        };

        match self.open::<T>(key, &record)? {
            Opened::Current(value) => Ok(Some(value)),
            Opened::Migrated { value, from } => {
                self.save_with_key_async(key, &value).await?;
                info!(
                    key,
                    type_tag = T::TYPE_TAG,
                    from,
                    to = T::SCHEMA_VERSION,
                    "migrated record re-saved"
                );
                Ok(Some(value))
            }
        }
    }

    /// Async [`load_or_default`](Self::load_or_default).
    pub async fn load_or_default_async<T: Persistable + Default + Send + Sync>(
        &self,
    ) -> PersistResult<T> {
        Ok(self.load_async().await?.unwrap_or_default())
    }

    /// Async [`load_or_default_with_key`](Self::load_or_default_with_key).
    pub async fn load_or_default_with_key_async<T: Persistable + Default + Send + Sync>(
        &self,
        key: &str,
    ) -> PersistResult<T> {
        Ok(self.load_with_key_async(key).await?.unwrap_or_default())
    }

    /// Async [`exists`](Self::exists).
    pub async fn exists_async<T: Persistable>(&self) -> PersistResult<bool> {
        self.exists_with_key_async(T::TYPE_TAG).await
    }

    /// Async [`exists_with_key`](Self::exists_with_key).
    pub async fn exists_with_key_async(&self, key: &str) -> PersistResult<bool> {
        Ok(self.store.exists_async(key).await?)
    }

    /// Async [`delete`](Self::delete).
    pub async fn delete_async<T: Persistable>(&self) -> PersistResult<bool> {
        self.delete_with_key_async(T::TYPE_TAG).await
    }

    /// Async [`delete_with_key`](Self::delete_with_key).
    pub async fn delete_with_key_async(&self, key: &str) -> PersistResult<bool> {
        Ok(self.store.delete_async(key).await?)
    }
}

impl<S: std::fmt::Debug, C> std::fmt::Debug for PersistenceManager<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceManager")
            .field("store", &self.store)
            .field("cipher", &self.cipher.cipher_id())
            .field("validator", &self.validator.validator_id())
            .field("options", &self.options)
            .finish()
    }
}

//! Error types for Tessera
//!
//! Every pipeline failure surfaces as one of four distinguishable kinds:
//!
//! - [`PersistError::Validation`]: the record is present but its digest does not match
//! - [`PersistError::Migration`]: a required migrator is missing or failed
//! - [`PersistError::Encryption`]: encrypt or decrypt failed
//! - [`PersistError::Persistence`]: store I/O, serialization or record decoding failed
//!
//! A missing record is not an error. Loads return `Option<T>`.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PersistResult<T> = std::result::Result<T, PersistError>;

/// Top-level error for save/load/exists/delete operations
#[derive(Debug, Error)]
pub enum PersistError {
    /// Digest verification failed (data present but untrusted)
    #[error("Validation failed for key '{key}' (type {type_tag}): {reason}")]
    Validation {
        /// Key of the record that failed verification
        key: String,
        /// Type tag recorded in the envelope
        type_tag: String,
        /// What did not match
        reason: String,
    },

    /// Schema migration could not bring the payload to the current version
    #[error("Migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Encrypting or decrypting the stored record failed
    #[error("Encryption failed: {0}")]
    Encryption(#[from] CipherError),

    /// Store I/O fault, serialization fault or undecodable record
    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceFailure),
}

impl PersistError {
    /// Create a validation error for a record
    pub fn validation(
        key: impl Into<String>,
        type_tag: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PersistError::Validation {
            key: key.into(),
            type_tag: type_tag.into(),
            reason: reason.into(),
        }
    }

    /// True for digest mismatches
    pub fn is_validation(&self) -> bool {
        matches!(self, PersistError::Validation { .. })
    }

    /// True for missing or failing migrators
    pub fn is_migration(&self) -> bool {
        matches!(self, PersistError::Migration(_))
    }

    /// True for cipher failures
    pub fn is_encryption(&self) -> bool {
        matches!(self, PersistError::Encryption(_))
    }

    /// True for store, serialization and decoding failures
    pub fn is_persistence(&self) -> bool {
        matches!(self, PersistError::Persistence(_))
    }
}

impl From<StoreError> for PersistError {
    fn from(e: StoreError) -> Self {
        PersistError::Persistence(PersistenceFailure::Store(e))
    }
}

/// Persistence-level failures
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    /// Backing store fault
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Payload codec could not serialize or deserialize the value
    #[error("Serialization error ({codec_id}): {detail}")]
    Serialization {
        /// Codec that failed
        codec_id: String,
        /// Human-readable error description
        detail: String,
    },

    /// Stored bytes do not decode to an envelope
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Envelope type tag differs from the requested type
    #[error("Type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch {
        /// Type tag of the requested type
        expected: String,
        /// Type tag recorded in the envelope
        found: String,
    },
}

impl PersistenceFailure {
    /// Create a serialization failure
    pub fn serialization(codec_id: impl Into<String>, detail: impl ToString) -> Self {
        PersistenceFailure::Serialization {
            codec_id: codec_id.into(),
            detail: detail.to_string(),
        }
    }
}

/// Byte store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("I/O error during {op} of '{key}': {source}")]
    Io {
        /// Operation that failed (e.g. "save", "load")
        op: &'static str,
        /// Key being accessed
        key: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Key cannot be used as a storage location
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// Key as supplied by the caller
        key: String,
        /// Why the key was rejected
        reason: String,
    },

    /// Record file extension cannot be used by a file store
    #[error("Invalid extension '{extension}': {reason}")]
    InvalidExtension {
        /// Extension as supplied by the caller
        extension: String,
        /// Why the extension was rejected
        reason: String,
    },

    /// Background I/O task did not complete
    #[error("Store task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Create an I/O error with operation context
    pub fn io(op: &'static str, key: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            op,
            key: key.into(),
            source,
        }
    }

    /// Create an invalid-extension error
    pub fn invalid_extension(extension: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidExtension {
            extension: extension.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Cipher errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Encryption failed.
    #[error("Encrypt error (cipher={cipher_id}): {detail}")]
    EncryptFailed {
        /// Cipher that attempted the encrypt
        cipher_id: String,
        /// Human-readable error description
        detail: String,
    },

    /// Decryption failed (wrong key, corrupted or truncated ciphertext).
    ///
    /// Carries the cipher identity and data length so callers can
    /// distinguish a wrong-cipher error from data corruption.
    #[error("Decrypt error (cipher={cipher_id}, data_len={data_len}): {detail}")]
    DecryptFailed {
        /// Cipher that attempted the decrypt
        cipher_id: String,
        /// Length of the data that failed to decrypt
        data_len: usize,
        /// Human-readable error description
        detail: String,
    },

    /// Key material is missing or unusable.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// Unknown cipher identifier.
    #[error("Unknown cipher: {0}")]
    UnknownCipher(String),
}

impl CipherError {
    /// Create an encrypt error.
    pub fn encrypt(cipher_id: impl Into<String>, detail: impl Into<String>) -> Self {
        CipherError::EncryptFailed {
            cipher_id: cipher_id.into(),
            detail: detail.into(),
        }
    }

    /// Create a decrypt error with full diagnostic context.
    pub fn decrypt(cipher_id: impl Into<String>, data_len: usize, detail: impl Into<String>) -> Self {
        CipherError::DecryptFailed {
            cipher_id: cipher_id.into(),
            data_len,
            detail: detail.into(),
        }
    }
}

/// Migration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// No migrator registered for a required version step
    #[error("No migrator registered for type '{type_tag}' from version {from} to {to}")]
    MissingStep {
        /// Type whose chain is incomplete
        type_tag: String,
        /// Source version of the missing step
        from: u32,
        /// Target version of the missing step
        to: u32,
    },

    /// A registered migrator returned an error
    #[error("Migrator for type '{type_tag}' ({from} -> {to}) failed: {reason}")]
    StepFailed {
        /// Type being migrated
        type_tag: String,
        /// Source version of the failing step
        from: u32,
        /// Target version of the failing step
        to: u32,
        /// Error reported by the migrator
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = PersistError::validation("p1", "player", "digest mismatch");
        let msg = err.to_string();
        assert!(msg.contains("Validation failed"));
        assert!(msg.contains("p1"));
        assert!(msg.contains("player"));
        assert!(msg.contains("digest mismatch"));
    }

    #[test]
    fn test_error_display_missing_step() {
        let err: PersistError = MigrationError::MissingStep {
            type_tag: "player".to_string(),
            from: 2,
            to: 3,
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("player"));
        assert!(msg.contains("from version 2 to 3"));
    }

    #[test]
    fn test_error_display_decrypt() {
        let err = CipherError::decrypt("aes-256-gcm", 42, "authentication tag mismatch");
        let msg = err.to_string();
        assert!(msg.contains("aes-256-gcm"));
        assert!(msg.contains("42"));
        assert!(msg.contains("authentication tag mismatch"));
    }

    #[test]
    fn test_error_display_io() {
        let err = StoreError::io(
            "save",
            "p1",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("save"));
        assert!(msg.contains("p1"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_store_error_is_persistence() {
        let err: PersistError = StoreError::invalid_key("", "empty").into();
        assert!(err.is_persistence());
        assert!(matches!(
            err,
            PersistError::Persistence(PersistenceFailure::Store(StoreError::InvalidKey { .. }))
        ));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors: Vec<PersistError> = vec![
            PersistError::validation("k", "t", "r"),
            MigrationError::MissingStep {
                type_tag: "t".to_string(),
                from: 1,
                to: 2,
            }
            .into(),
            CipherError::UnknownCipher("rot13".to_string()).into(),
            PersistenceFailure::CorruptRecord("truncated".to_string()).into(),
        ];

        let kinds: Vec<[bool; 4]> = errors
            .iter()
            .map(|e| {
                [
                    e.is_validation(),
                    e.is_migration(),
                    e.is_encryption(),
                    e.is_persistence(),
                ]
            })
            .collect();

        for (i, flags) in kinds.iter().enumerate() {
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            assert!(flags[i]);
        }
    }

    #[test]
    fn test_cipher_error_equality() {
        let err1 = CipherError::decrypt("aes-256-gcm", 10, "bad tag");
        let err2 = CipherError::decrypt("aes-256-gcm", 10, "bad tag");
        let err3 = CipherError::decrypt("aes-256-gcm", 11, "bad tag");

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}

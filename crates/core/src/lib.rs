//! Core types for Tessera
//!
//! This crate defines the foundational types shared by every layer of the
//! persistence pipeline:
//! - Error: the four-kind failure taxonomy (validation, migration, encryption, persistence)
//! - Envelope: versioned, typed, hashed wrapper around a serialized payload
//! - StorageKey: key sanitization and default key derivation
//! - Persistable: declared type identity and schema version
//! - PayloadCodec: serializer seam (JSON by default)
//! - PersistenceConfig: strategy selection (TOML file or builder)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod key;
pub mod persistable;

pub use codec::{JsonCodec, PayloadCodec};
pub use config::{ConfigError, PersistenceConfig, ValidatorKind, CONFIG_FILE_NAME};
pub use envelope::{now_millis, Envelope};
pub use error::{
    CipherError, MigrationError, PersistError, PersistResult, PersistenceFailure, StoreError,
};
pub use key::{default_key, StorageKey};
pub use persistable::Persistable;

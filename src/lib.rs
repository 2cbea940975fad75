//! Tessera - versioned, validated and optionally encrypted persistence
//!
//! Tessera saves typed values under string keys and loads them back, passing
//! each value through a fixed pipeline: serialize, digest, wrap in a versioned
//! envelope, encrypt, store. Loading reverses the pipeline, verifies the
//! digest, and migrates records written by older schema versions.
//!
//! # Quick Start
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tessera::{MemoryStore, Persistable, PersistenceManager};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Player {
//!     name: String,
//!     hp: u32,
//! }
//!
//! impl Persistable for Player {
//!     const TYPE_TAG: &'static str = "player";
//! }
//!
//! let manager = PersistenceManager::new(MemoryStore::new());
//! let hero = Player { name: "Hero".into(), hp: 100 };
//!
//! manager.save_with_key("p1", &hero)?;
//! assert_eq!(manager.load_with_key::<Player>("p1")?, Some(hero));
//! # Ok::<(), tessera::PersistError>(())
//! ```
//!
//! # Architecture
//!
//! | Crate | Concern |
//! |-------|---------|
//! | `tessera-core` | envelope, errors, keys, codec, config |
//! | `tessera-storage` | byte stores (memory, file) |
//! | `tessera-security` | ciphers and validators |
//! | `tessera-engine` | persistence manager and migrations |

pub use tessera_core::{
    default_key, CipherError, ConfigError, Envelope, JsonCodec, MigrationError, PayloadCodec,
    PersistError, PersistResult, Persistable, PersistenceConfig, PersistenceFailure, StorageKey,
    StoreError, ValidatorKind, CONFIG_FILE_NAME,
};
pub use tessera_engine::{
    EnvelopeInfo, MigrationManager, Migrator, PersistenceManager, PipelineOptions, SetupError,
};
pub use tessera_security::{
    get_cipher, get_validator, AesGcmCipher, ChecksumValidator, Cipher, HashValidator,
    IdentityCipher, NoValidator, Validator,
};
pub use tessera_storage::{AsyncByteStore, ByteStore, FileStore, MemoryStore};

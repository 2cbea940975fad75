//! Building a manager from configuration
//!
//! Strategy selection is a setup concern: a bad configuration is reported
//! once, when the manager is built, and never surfaces from save/load.

use std::path::Path;

use tessera_core::{CipherError, ConfigError, PersistenceConfig, StoreError, CONFIG_FILE_NAME};
use tessera_security::{cipher_from_config, get_validator};
use tessera_storage::{ByteStore, FileStore};
use tracing::info;

use crate::manager::PersistenceManager;

/// Errors raised while building a manager
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Configuration is unreadable or invalid
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Store root could not be opened
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    /// Cipher could not be constructed from the configured key material
    #[error("Failed to configure cipher: {0}")]
    Cipher(#[from] CipherError),
}

impl<S: ByteStore> PersistenceManager<S> {
    /// Build a manager over `store` with the strategies selected by `config`.
    ///
    /// `config.base_path` and `config.extension` are ignored; the store is
    /// already constructed.
    pub fn with_config(store: S, config: &PersistenceConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let manager = PersistenceManager::new(store)
            .with_cipher(cipher_from_config(config)?)
            .with_validator(get_validator(config.effective_validator()))
            .with_validation(config.enable_validation)
            .with_versioning(config.enable_versioning);

        info!(
            store = manager.store().store_id(),
            cipher = manager.cipher_id(),
            validator = manager.validator_id(),
            versioning = config.enable_versioning,
            "persistence manager ready"
        );
        Ok(manager)
    }
}

impl PersistenceManager<FileStore> {
    /// Build a file-backed manager from `config`.
    ///
    /// ```no_run
    /// use tessera_core::{PersistenceConfig, ValidatorKind};
    /// use tessera_engine::PersistenceManager;
    ///
    /// let config = PersistenceConfig::new()
    ///     .with_base_path("saves")
    ///     .with_validation(ValidatorKind::Checksum)
    ///     .with_encryption("passphrase", Some("install-salt"));
    /// let manager = PersistenceManager::from_config(&config).unwrap();
    /// ```
    pub fn from_config(config: &PersistenceConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let store = FileStore::open(&config.base_path, config.extension.clone())?;
        Self::with_config(store, config)
    }

    /// Open a file-backed manager configured by `dir/tessera.toml`.
    ///
    /// The config file is created with defaults if missing. A relative
    /// `base_path` is resolved against `dir`.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, SetupError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        PersistenceConfig::write_default_if_missing(&config_path)?;
        let mut config = PersistenceConfig::from_file(&config_path)?;
        if config.base_path.is_relative() {
            config.base_path = dir.join(&config.base_path);
        }
        Self::from_config(&config)
    }
}

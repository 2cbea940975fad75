//! Pipeline configuration via `tessera.toml`
//!
//! The configuration selects strategies only: where the file store lives,
//! whether records are encrypted, which digest is computed, and whether
//! schema migration runs on load. It introduces no behavior of its own.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// Digest strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// No digest is stored; verification always succeeds
    None,
    /// Fast non-cryptographic checksum (xxHash3-64)
    Checksum,
    /// Cryptographic hash (SHA-256)
    #[default]
    Sha256,
}

impl ValidatorKind {
    /// Configuration name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidatorKind::None => "none",
            ValidatorKind::Checksum => "checksum",
            ValidatorKind::Sha256 => "sha256",
        }
    }

    /// Parse a configuration name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(ValidatorKind::None),
            "checksum" => Some(ValidatorKind::Checksum),
            "sha256" => Some(ValidatorKind::Sha256),
            _ => None,
        }
    }
}

/// Persistence pipeline configuration loaded from `tessera.toml`.
///
/// # Example
///
/// ```toml
/// base_path = "data"
/// extension = "dat"
///
/// enable_validation = true
/// validator = "sha256"      # "none" | "checksum" | "sha256"
///
/// enable_encryption = false
/// # encryption_key = "change me"
/// # encryption_salt = "per-install salt"
///
/// enable_versioning = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Root directory of the file store
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    /// File extension for stored records (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Encrypt stored records with AES-256-GCM
    #[serde(default)]
    pub enable_encryption: bool,
    /// Passphrase the encryption key is derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
    /// Optional salt mixed into key derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_salt: Option<String>,
    /// Compute and verify payload digests
    #[serde(default = "default_true")]
    pub enable_validation: bool,
    /// Digest strategy used when validation is enabled
    #[serde(default)]
    pub validator: ValidatorKind,
    /// Run registered migrators when loading older records
    #[serde(default = "default_true")]
    pub enable_versioning: bool,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_extension() -> String {
    "dat".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            base_path: default_base_path(),
            extension: default_extension(),
            enable_encryption: false,
            encryption_key: None,
            encryption_salt: None,
            enable_validation: true,
            validator: ValidatorKind::default(),
            enable_versioning: true,
        }
    }
}

impl PersistenceConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config rooted at `base_path`, otherwise defaults
    pub fn for_testing(base_path: impl AsRef<Path>) -> Self {
        PersistenceConfig {
            base_path: base_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the file store root directory
    pub fn with_base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the record file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable encryption with a passphrase and optional salt
    pub fn with_encryption(mut self, key: impl Into<String>, salt: Option<&str>) -> Self {
        self.enable_encryption = true;
        self.encryption_key = Some(key.into());
        self.encryption_salt = salt.map(str::to_string);
        self
    }

    /// Disable encryption
    pub fn without_encryption(mut self) -> Self {
        self.enable_encryption = false;
        self
    }

    /// Enable validation with the given digest strategy
    pub fn with_validation(mut self, kind: ValidatorKind) -> Self {
        self.enable_validation = true;
        self.validator = kind;
        self
    }

    /// Disable validation
    pub fn without_validation(mut self) -> Self {
        self.enable_validation = false;
        self
    }

    /// Enable or disable schema migration on load
    pub fn with_versioning(mut self, enabled: bool) -> Self {
        self.enable_versioning = enabled;
        self
    }

    /// Validator in effect: `None` whenever validation is disabled
    pub fn effective_validator(&self) -> ValidatorKind {
        if self.enable_validation {
            self.validator
        } else {
            ValidatorKind::None
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.is_empty() {
            return Err(ConfigError::InvalidExtension(
                "extension must not be empty".to_string(),
            ));
        }
        if self.extension.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidExtension(format!(
                "'{}' must not contain path separators or dots",
                self.extension
            )));
        }
        if self.enable_encryption
            && self
                .encryption_key
                .as_deref()
                .map_or(true, |k| k.is_empty())
        {
            return Err(ConfigError::MissingEncryptionKey);
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Tessera persistence configuration
#
# Root directory and file extension of the file-backed store.
base_path = "data"
extension = "dat"

# Integrity: digest computed over every payload and verified on load.
#   "none"     = no digest stored
#   "checksum" = xxHash3-64, fast, detects accidental corruption
#   "sha256"   = SHA-256, detects deliberate tampering
enable_validation = true
validator = "sha256"

# Confidentiality: AES-256-GCM over the whole stored record.
# The key is derived from the passphrase and optional salt.
enable_encryption = false
# encryption_key = "change me"
# encryption_salt = "per-install salt"

# Run registered migrators when a stored record is older than its type.
enable_versioning = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: PersistenceConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Config I/O error at {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config file '{path}': {detail}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        detail: String,
    },

    /// Encryption enabled without a key
    #[error("Encryption is enabled but no encryption_key is set")]
    MissingEncryptionKey,

    /// Unusable file extension
    #[error("Invalid extension: {0}")]
    InvalidExtension(String),
}

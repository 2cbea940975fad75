//! Payload codec abstraction.
//!
//! The codec turns a typed value into the textual payload carried by an
//! envelope and back. Migrators operate on this text, so the format must be
//! editable without the old type definition. JSON is the default.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistenceFailure;

/// Payload codec trait.
///
/// Codecs are assumed pure and total for well-formed input.
pub trait PayloadCodec: Send + Sync {
    /// Serialize a value to text.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, PersistenceFailure>;

    /// Deserialize a value from text.
    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, PersistenceFailure>;

    /// Unique codec identifier (used in error messages).
    fn codec_id(&self) -> &str;
}

/// JSON payload codec (serde_json).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact JSON output
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON output
    pub fn pretty() -> Self {
        JsonCodec { pretty: true }
    }
}

impl PayloadCodec for JsonCodec {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, PersistenceFailure> {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.map_err(|e| PersistenceFailure::serialization(self.codec_id(), e))
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T, PersistenceFailure> {
        serde_json::from_str(text).map_err(|e| PersistenceFailure::serialization(self.codec_id(), e))
    }

    fn codec_id(&self) -> &str {
        "json"
    }
}

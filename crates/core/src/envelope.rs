//! Envelope: the versioned wrapper placed around a serialized value
//!
//! ## Wire Format
//!
//! The encoded envelope is a JSON object:
//!
//! ```text
//! {
//!   "schemaVersion": 3,             schema version of the payload
//!   "typeTag": "player",            stable type identity
//!   "payload": "eyJuYW1lIjoi...",   base64 of the serialized value
//!   "digest": "q83vASNFZ4k=",       base64 digest of payload (omitted when none)
//!   "createdAt": 1760612345678      epoch milliseconds
//! }
//! ```
//!
//! The stored record is `Cipher::encrypt(encode(envelope))`. The digest is
//! computed over `payload` exactly as stored here, so encryption never alters
//! what the digest authenticates.
//!
//! Decoding ignores unknown fields so that newer writers can extend the
//! envelope without breaking older readers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceFailure;

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Versioned, typed, hashed, timestamped wrapper around a serialized payload.
///
/// Built fresh on every save and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Schema version of `payload`
    pub schema_version: u32,
    /// Stable type identity of the value
    pub type_tag: String,
    /// Serialized value (pre-encryption)
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// Digest over `payload`, if validation was enabled at write time
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_opt")]
    pub digest: Option<Vec<u8>>,
    /// Creation time in epoch milliseconds
    pub created_at: u64,
}

impl Envelope {
    /// Create an envelope stamped with the current time
    pub fn new(
        schema_version: u32,
        type_tag: impl Into<String>,
        payload: Vec<u8>,
        digest: Option<Vec<u8>>,
    ) -> Self {
        Envelope {
            schema_version,
            type_tag: type_tag.into(),
            payload,
            digest,
            created_at: now_millis(),
        }
    }

    /// Encode to the JSON wire form
    pub fn encode(&self) -> Result<Vec<u8>, PersistenceFailure> {
        serde_json::to_vec(self)
            .map_err(|e| PersistenceFailure::serialization("envelope", e))
    }

    /// Decode from the JSON wire form
    pub fn decode(bytes: &[u8]) -> Result<Self, PersistenceFailure> {
        serde_json::from_slice(bytes).map_err(|e| {
            PersistenceFailure::CorruptRecord(format!(
                "envelope decode failed ({} bytes): {}",
                bytes.len(),
                e
            ))
        })
    }

    /// Payload as UTF-8 text
    pub fn payload_text(&self) -> Result<&str, PersistenceFailure> {
        std::str::from_utf8(&self.payload).map_err(|e| {
            PersistenceFailure::CorruptRecord(format!("payload is not UTF-8: {}", e))
        })
    }

    /// Whether a digest was stored
    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

mod base64_opt {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => STANDARD
                .decode(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

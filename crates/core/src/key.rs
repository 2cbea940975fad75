//! Record keys
//!
//! A key identifies one logical record. Keys are sanitized before they are
//! used as a storage location: characters that are illegal in file names are
//! replaced with `_`, so `"saves/slot:1"` is stored as `"saves_slot_1"`.

use crate::error::StoreError;
use crate::persistable::Persistable;

/// Characters replaced during sanitization (in addition to ASCII control characters)
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Key sanitization helpers
pub struct StorageKey;

impl StorageKey {
    /// Sanitize a raw key for use as a storage location.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidKey` for an empty key or the reserved
    /// names `.` and `..`.
    pub fn sanitize(raw: &str) -> Result<String, StoreError> {
        if raw.is_empty() {
            return Err(StoreError::invalid_key(raw, "key must not be empty"));
        }
        if raw == "." || raw == ".." {
            return Err(StoreError::invalid_key(raw, "reserved name"));
        }

        Ok(raw
            .chars()
            .map(|c| {
                if c.is_ascii_control() || ILLEGAL_CHARS.contains(&c) {
                    '_'
                } else {
                    c
                }
            })
            .collect())
    }

    /// True if `raw` would be stored unchanged
    pub fn is_clean(raw: &str) -> bool {
        matches!(Self::sanitize(raw), Ok(ref s) if s == raw)
    }
}

/// Default key for a type: its stable type tag.
///
/// `save(&value)` and `load::<T>()` address the same record through this key.
pub fn default_key<T: Persistable>() -> &'static str {
    T::TYPE_TAG
}

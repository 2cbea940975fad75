//! AES-256-GCM cipher.
//!
//! ## Record Layout
//!
//! ```text
//! +------------------+
//! | Nonce (12 bytes) |  random per record (OsRng)
//! +------------------+
//! | Ciphertext       |  same length as plaintext
//! +------------------+
//! | Tag (16 bytes)   |  GCM authentication tag
//! +------------------+
//! ```
//!
//! The 256-bit key is derived from a passphrase and optional salt by
//! iterated SHA-256 (see [`derive_key`]).

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tessera_core::CipherError;

use super::traits::Cipher;
use super::AES_GCM_CIPHER_ID;

/// Nonce length in bytes (96-bit GCM nonce)
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

/// SHA-256 rounds applied during key derivation
pub const KEY_DERIVATION_ROUNDS: u32 = 10_000;

/// Domain separator mixed into the first derivation round
const KEY_DOMAIN: &[u8] = b"tessera/aes-256-gcm/v1";

/// Derive a 256-bit key from a passphrase and optional salt.
///
/// Deterministic: the same passphrase and salt always yield the same key,
/// so records written by one process can be read by the next.
///
/// This is iterated SHA-256 key stretching, not a memory-hard KDF such as
/// Argon2 or scrypt. A low-entropy passphrase remains open to offline
/// guessing by anyone holding the stored records.
pub fn derive_key(passphrase: &str, salt: Option<&str>) -> [u8; KEY_LEN] {
    let salt = salt.unwrap_or("").as_bytes();

    let mut hasher = Sha256::new();
    hasher.update(KEY_DOMAIN);
    hasher.update((salt.len() as u64).to_le_bytes());
    hasher.update(salt);
    hasher.update(passphrase.as_bytes());
    let mut key: [u8; KEY_LEN] = hasher.finalize().into();

    for _ in 1..KEY_DERIVATION_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(salt);
        key = hasher.finalize().into();
    }
    key
}

/// AES-256-GCM authenticated encryption.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    /// Create a cipher keyed from a passphrase and optional salt.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` for an empty passphrase.
    pub fn new(passphrase: &str, salt: Option<&str>) -> Result<Self, CipherError> {
        if passphrase.is_empty() {
            return Err(CipherError::InvalidKey(
                "passphrase must not be empty".to_string(),
            ));
        }
        Self::from_key(&derive_key(passphrase, salt))
    }

    /// Create a cipher from raw key bytes (must be 32 bytes).
    pub fn from_key(key: &[u8]) -> Result<Self, CipherError> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| {
            CipherError::InvalidKey(format!("expected {} key bytes, got {}", KEY_LEN, key.len()))
        })?;
        Ok(AesGcmCipher { cipher })
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, data)
            .map_err(|_| CipherError::encrypt(AES_GCM_CIPHER_ID, "AES-GCM seal failed"))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::decrypt(
                AES_GCM_CIPHER_ID,
                data.len(),
                format!("record shorter than nonce + tag ({} bytes)", NONCE_LEN + TAG_LEN),
            ));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                CipherError::decrypt(
                    AES_GCM_CIPHER_ID,
                    data.len(),
                    "authentication failed (wrong key or corrupted data)",
                )
            })
    }

    fn cipher_id(&self) -> &str {
        AES_GCM_CIPHER_ID
    }
}

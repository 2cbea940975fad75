//! Cipher abstraction.
//!
//! The cipher is applied to the encoded envelope as a whole, after the
//! digest has been computed over the plaintext payload. Encryption therefore
//! never changes what the digest authenticates.
//!
//! # Usage
//!
//! ```
//! use tessera_security::{get_cipher, Cipher};
//!
//! let cipher = get_cipher("aes-256-gcm", Some("passphrase"), Some("salt")).unwrap();
//! let sealed = cipher.encrypt(b"record").unwrap();
//! assert_eq!(cipher.decrypt(&sealed).unwrap(), b"record");
//! ```

mod aead;
mod identity;
mod traits;

pub use aead::{derive_key, AesGcmCipher, KEY_DERIVATION_ROUNDS, NONCE_LEN, TAG_LEN};
pub use identity::IdentityCipher;
pub use traits::Cipher;

use tessera_core::{CipherError, PersistenceConfig};

/// Identifier of the pass-through cipher
pub const IDENTITY_CIPHER_ID: &str = "identity";

/// Identifier of the AES-256-GCM cipher
pub const AES_GCM_CIPHER_ID: &str = "aes-256-gcm";

/// Get a cipher by its identifier.
///
/// # Known Ciphers
///
/// - `"identity"`: No-op cipher (pass-through); key and salt are ignored
/// - `"aes-256-gcm"`: AES-256-GCM; requires a passphrase
pub fn get_cipher(
    cipher_id: &str,
    passphrase: Option<&str>,
    salt: Option<&str>,
) -> Result<Box<dyn Cipher>, CipherError> {
    match cipher_id {
        IDENTITY_CIPHER_ID => Ok(Box::new(IdentityCipher)),
        AES_GCM_CIPHER_ID => {
            let passphrase = passphrase.ok_or_else(|| {
                CipherError::InvalidKey("aes-256-gcm requires a passphrase".to_string())
            })?;
            Ok(Box::new(AesGcmCipher::new(passphrase, salt)?))
        }
        _ => Err(CipherError::UnknownCipher(cipher_id.to_string())),
    }
}

/// Cipher selected by a pipeline configuration.
pub fn cipher_from_config(config: &PersistenceConfig) -> Result<Box<dyn Cipher>, CipherError> {
    if config.enable_encryption {
        get_cipher(
            AES_GCM_CIPHER_ID,
            config.encryption_key.as_deref(),
            config.encryption_salt.as_deref(),
        )
    } else {
        get_cipher(IDENTITY_CIPHER_ID, None, None)
    }
}

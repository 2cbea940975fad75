//! Cipher trait definitions.

use tessera_core::CipherError;

/// Reversible byte transform applied to every stored record.
///
/// The pipeline always runs the cipher, so its shape is the same whether or
/// not confidentiality is enabled; [`IdentityCipher`](super::IdentityCipher)
/// stands in when it is not.
///
/// # Thread Safety
///
/// Ciphers must be `Send + Sync` to allow concurrent encrypt/decrypt
/// from multiple threads.
pub trait Cipher: Send + Sync {
    /// Encrypt bytes for storage.
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Reverse [`encrypt`](Cipher::encrypt).
    ///
    /// Returns `CipherError::DecryptFailed` for a wrong key or corrupted
    /// ciphertext. This is never reported as a validation failure.
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Unique cipher identifier.
    fn cipher_id(&self) -> &str;
}

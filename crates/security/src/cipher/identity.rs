//! Identity cipher (no transformation).

use tessera_core::CipherError;

use super::traits::Cipher;
use super::IDENTITY_CIPHER_ID;

/// Identity cipher - no transformation.
///
/// Bytes pass through unchanged. Used when encryption is disabled.
///
/// # Example
///
/// ```
/// use tessera_security::{Cipher, IdentityCipher};
///
/// let cipher = IdentityCipher;
/// let data = b"hello world";
///
/// let encrypted = cipher.encrypt(data).unwrap();
/// assert_eq!(data.as_slice(), encrypted.as_slice());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCipher;

impl Cipher for IdentityCipher {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(data.to_vec())
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(data.to_vec())
    }

    fn cipher_id(&self) -> &str {
        IDENTITY_CIPHER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let cipher = IdentityCipher;
        let data: Vec<u8> = (0..=255).collect();

        assert_eq!(cipher.encrypt(&data).unwrap(), data);
        assert_eq!(cipher.decrypt(&data).unwrap(), data);
    }

    #[test]
    fn test_identity_empty() {
        let cipher = IdentityCipher;
        assert!(cipher.encrypt(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_cipher_id() {
        assert_eq!(IdentityCipher.cipher_id(), "identity");
    }
}

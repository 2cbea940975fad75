//! Validator trait definitions.

/// Integrity digest over plaintext payload bytes.
///
/// The digest is computed after serialization and before encryption, over
/// the payload exactly as it sits in the envelope.
pub trait Validator: Send + Sync {
    /// Compute the digest of `data`.
    ///
    /// An empty digest means this strategy stores none.
    fn compute_digest(&self, data: &[u8]) -> Vec<u8>;

    /// True if `digest` matches `data`.
    fn verify(&self, data: &[u8], digest: &[u8]) -> bool {
        self.compute_digest(data) == digest
    }

    /// Unique validator identifier.
    fn validator_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::HashValidator;

    // Test that trait is object-safe
    fn _accepts_box_dyn_validator(_validator: Box<dyn Validator>) {}

    #[test]
    fn test_default_verify_uses_compute_digest() {
        let validator: Box<dyn Validator> = Box::new(HashValidator);
        let digest = validator.compute_digest(b"payload");

        assert!(validator.verify(b"payload", &digest));
        assert!(!validator.verify(b"payloaD", &digest));
        assert!(!validator.verify(b"payload", &digest[..16]));
    }
}

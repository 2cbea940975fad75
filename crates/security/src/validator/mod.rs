//! Integrity validators.
//!
//! Three interchangeable strategies, selected by configuration:
//!
//! | Kind | Validator | Digest |
//! |------|-----------|--------|
//! | `none` | [`NoValidator`] | none stored, always verifies |
//! | `checksum` | [`ChecksumValidator`] | xxHash3-64, 8 bytes big-endian |
//! | `sha256` | [`HashValidator`] | SHA-256, 32 bytes |

mod traits;

pub use traits::Validator;

use sha2::{Digest, Sha256};
use tessera_core::ValidatorKind;
use xxhash_rust::xxh3::xxh3_64;

/// Validator that stores no digest and accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidator;

impl Validator for NoValidator {
    fn compute_digest(&self, _data: &[u8]) -> Vec<u8> {
        Vec::new()
    }

    fn verify(&self, _data: &[u8], _digest: &[u8]) -> bool {
        true
    }

    fn validator_id(&self) -> &str {
        "none"
    }
}

/// Fast non-cryptographic checksum (xxHash3-64).
///
/// Detects accidental corruption, not deliberate tampering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumValidator;

impl Validator for ChecksumValidator {
    fn compute_digest(&self, data: &[u8]) -> Vec<u8> {
        xxh3_64(data).to_be_bytes().to_vec()
    }

    fn validator_id(&self) -> &str {
        "checksum"
    }
}

/// Cryptographic hash (SHA-256).
#[derive(Debug, Clone, Copy, Default)]
pub struct HashValidator;

impl Validator for HashValidator {
    fn compute_digest(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn validator_id(&self) -> &str {
        "sha256"
    }
}

/// Get the validator for a configured kind.
pub fn get_validator(kind: ValidatorKind) -> Box<dyn Validator> {
    match kind {
        ValidatorKind::None => Box::new(NoValidator),
        ValidatorKind::Checksum => Box::new(ChecksumValidator),
        ValidatorKind::Sha256 => Box::new(HashValidator),
    }
}

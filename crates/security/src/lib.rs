//! Confidentiality and integrity strategies for Tessera
//!
//! - Cipher: reversible byte transform applied to the encoded envelope
//!   (`IdentityCipher` pass-through, `AesGcmCipher` AES-256-GCM)
//! - Validator: digest computed over the plaintext payload
//!   (`NoValidator`, `ChecksumValidator` xxHash3-64, `HashValidator` SHA-256)
//!
//! Strategies are selected by configuration through [`get_cipher`] and
//! [`get_validator`]; callers only ever see the traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod validator;

pub use cipher::{
    cipher_from_config, derive_key, get_cipher, AesGcmCipher, Cipher, IdentityCipher,
    AES_GCM_CIPHER_ID, IDENTITY_CIPHER_ID,
};
pub use validator::{
    get_validator, ChecksumValidator, HashValidator, NoValidator, Validator,
};

//! Shared fixtures for the engine integration suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tessera_core::{Envelope, Persistable};
use tessera_engine::PersistenceManager;
use tessera_security::{AesGcmCipher, Cipher};
use tessera_storage::{ByteStore, MemoryStore};

pub const PASSPHRASE: &str = "correct horse battery staple";
pub const SALT: &str = "install-7";

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness (visible with `--nocapture`).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hp: u32,
}

impl Persistable for Player {
    const TYPE_TAG: &'static str = "player";
}

pub fn hero() -> Player {
    Player {
        name: "Hero".to_string(),
        hp: 100,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub volume: u8,
    pub language: String,
    pub keybinds: Vec<(String, String)>,
}

impl Persistable for Settings {
    const TYPE_TAG: &'static str = "app.settings";
}

pub fn settings() -> Settings {
    Settings {
        volume: 7,
        language: "en-GB".to_string(),
        keybinds: vec![
            ("jump".to_string(), "space".to_string()),
            ("crouch".to_string(), "ctrl".to_string()),
        ],
    }
}

// ============================================================================
// Managers
// ============================================================================

/// One pipeline configuration under test
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub validation: bool,
    pub encryption: bool,
}

/// Validation on/off × encryption on/off
pub fn variants() -> [Variant; 4] {
    [
        Variant { validation: false, encryption: false },
        Variant { validation: true, encryption: false },
        Variant { validation: false, encryption: true },
        Variant { validation: true, encryption: true },
    ]
}

pub fn cipher() -> AesGcmCipher {
    AesGcmCipher::new(PASSPHRASE, Some(SALT)).unwrap()
}

/// Apply `variant` to a manager over any store.
pub fn configure<S: ByteStore>(store: S, variant: Variant) -> PersistenceManager<S> {
    let manager = PersistenceManager::new(store).with_validation(variant.validation);
    if variant.encryption {
        manager.with_cipher(Box::new(cipher()))
    } else {
        manager
    }
}

pub fn memory_manager(variant: Variant) -> PersistenceManager<MemoryStore> {
    configure(MemoryStore::new(), variant)
}

// ============================================================================
// Raw record access
// ============================================================================

/// Decode the envelope stored at `key`, decrypting if `encrypted`.
pub fn read_envelope<S: ByteStore>(store: &S, key: &str, encrypted: bool) -> Envelope {
    let record = store.load_raw(key).unwrap().expect("record present");
    let bytes = if encrypted {
        cipher().decrypt(&record).unwrap()
    } else {
        record
    };
    Envelope::decode(&bytes).unwrap()
}

/// Encode `envelope` and store it at `key`, encrypting if `encrypted`.
pub fn write_envelope<S: ByteStore>(store: &S, key: &str, envelope: &Envelope, encrypted: bool) {
    let bytes = envelope.encode().unwrap();
    let record = if encrypted {
        cipher().encrypt(&bytes).unwrap()
    } else {
        bytes
    };
    store.save_raw(key, &record).unwrap();
}

/// Rewrite the payload of the record at `key` without touching its digest.
pub fn tamper_payload<S: ByteStore>(store: &S, key: &str, encrypted: bool, payload: &[u8]) {
    let mut envelope = read_envelope(store, key, encrypted);
    envelope.payload = payload.to_vec();
    write_envelope(store, key, &envelope, encrypted);
}

//! Persistence engine for Tessera
//!
//! This crate orchestrates all lower layers:
//! - PersistenceManager: save/load/exists/delete over any byte store, sync and async
//! - MigrationManager: per-type, per-version payload upgrades chained on load
//! - Builder: strategy selection from a `PersistenceConfig` or `tessera.toml`
//!
//! The engine is the only component that knows the order of the pipeline
//! stages (serialize, digest, wrap, encode, encrypt, store) and their inverse.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod manager;
pub mod migration;

pub use builder::SetupError;
pub use manager::{EnvelopeInfo, PersistenceManager, PipelineOptions};
pub use migration::{MigrationManager, Migrator};

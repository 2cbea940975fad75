//! Byte storage layer for Tessera
//!
//! This crate implements the raw key → bytes backends the persistence
//! pipeline commits records to:
//! - ByteStore / AsyncByteStore: the backend contract (sync and async surfaces)
//! - MemoryStore: HashMap behind a RwLock, copying bytes in and out
//! - FileStore: one file per key under a root directory, atomic
//!   write-fsync-rename serialized through a per-instance write gate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{AsyncByteStore, ByteStore};

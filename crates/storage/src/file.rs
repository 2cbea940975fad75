//! File-backed byte store.
//!
//! Each key maps to one file under the store root:
//!
//! ```text
//! saves/                 root (created on open)
//! ├── p1.dat             record for key "p1"
//! ├── game.player.dat    record for key "game.player"
//! └── slot_1.dat         record for key "slot/1" (sanitized)
//! ```
//!
//! Writes go through write-temp → fsync → rename, so a reader sees either
//! the previous record or the new one, never a partial file. All writes
//! (saves, deletes, clears) on one store instance are serialized through a
//! single gate, even for different keys. Reads are not gated and may race
//! with an in-flight write to the same key (last writer wins).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tessera_core::{StorageKey, StoreError};
use tracing::{debug, warn};

use crate::traits::{AsyncByteStore, ByteStore};

/// Suffix appended to the record path while a write is in flight
const TEMP_SUFFIX: &str = "tmp";

/// One-file-per-key store under a root directory.
///
/// Cloning is cheap and yields a handle to the same instance: clones share
/// the write gate.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

#[derive(Debug)]
struct FileStoreInner {
    root: PathBuf,
    extension: String,
    write_gate: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// `extension` is the record file extension without the dot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidExtension` if `extension` is empty, is the
    /// temp-file suffix, or contains a dot or a character illegal in file
    /// names. Such an extension would hide records from `keys()` and `clear()`.
    pub fn open(root: impl AsRef<Path>, extension: impl Into<String>) -> Result<Self, StoreError> {
        let extension = extension.into();
        validate_extension(&extension)?;
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            warn!(root = %root.display(), error = %e, "failed to create store root");
            StoreError::io("open", root.display().to_string(), e)
        })?;

        Ok(FileStore {
            inner: Arc::new(FileStoreInner {
                root,
                extension,
                write_gate: Mutex::new(()),
            }),
        })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Record file extension
    pub fn extension(&self) -> &str {
        &self.inner.extension
    }

    /// File path for a key (after sanitization)
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let sanitized = StorageKey::sanitize(key)?;
        Ok(self
            .inner
            .root
            .join(format!("{}.{}", sanitized, self.inner.extension)))
    }

    fn io_error(&self, op: &'static str, key: &str, e: io::Error) -> StoreError {
        warn!(
            root = %self.inner.root.display(),
            key,
            op,
            error = %e,
            "file store I/O failure"
        );
        StoreError::io(op, key, e)
    }
}

/// An extension must be exactly what `Path::extension` reports for a record file
fn validate_extension(extension: &str) -> Result<(), StoreError> {
    if extension.is_empty() {
        return Err(StoreError::invalid_extension(extension, "must not be empty"));
    }
    if extension.contains('.') {
        return Err(StoreError::invalid_extension(extension, "must not contain a dot"));
    }
    if extension == TEMP_SUFFIX {
        return Err(StoreError::invalid_extension(
            extension,
            "reserved for in-flight writes",
        ));
    }
    if !StorageKey::is_clean(extension) {
        return Err(StoreError::invalid_extension(
            extension,
            "contains characters illegal in file names",
        ));
    }
    Ok(())
}

/// Write `bytes` to `path` atomically (write-fsync-rename)
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".");
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    let result = write_and_rename(&temp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    // Atomic rename
    fs::rename(temp_path, path)?;

    sync_parent(path)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::File::open(parent)?.sync_all()?;
    }
    Ok(())
}

// Directories cannot be opened for syncing on this platform
#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl ByteStore for FileStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        path.try_exists()
            .map_err(|e| self.io_error("exists", key, e))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        let _gate = self.inner.write_gate.lock();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "file store delete");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error("delete", key, e)),
        }
    }

    fn save_raw(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let _gate = self.inner.write_gate.lock();
        write_atomic(&path, bytes).map_err(|e| self.io_error("save", key, e))?;
        debug!(key, len = bytes.len(), "file store save");
        Ok(())
    }

    fn load_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("load", key, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let root_key = self.inner.root.display().to_string();
        let entries =
            fs::read_dir(&self.inner.root).map_err(|e| self.io_error("keys", &root_key, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error("keys", &root_key, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.inner.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let keys = self.keys()?;
        let _gate = self.inner.write_gate.lock();
        let mut removed = 0;
        for key in &keys {
            let path = self.path_for(key)?;
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_error("clear", key, e)),
            }
        }
        debug!(removed, root = %self.inner.root.display(), "file store cleared");
        Ok(removed)
    }

    fn store_id(&self) -> &str {
        "file"
    }
}

/// Run a blocking store call on Tokio's blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

// Same code path as the sync surface, so both share the write gate.
#[async_trait]
impl AsyncByteStore for FileStore {
    async fn exists_async(&self, key: &str) -> Result<bool, StoreError> {
        let store = self.clone();
        let key = key.to_string();
        run_blocking(move || store.exists(&key)).await
    }

    async fn delete_async(&self, key: &str) -> Result<bool, StoreError> {
        let store = self.clone();
        let key = key.to_string();
        run_blocking(move || store.delete(&key)).await
    }

    async fn save_raw_async(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let store = self.clone();
        let key = key.to_string();
        let bytes = bytes.to_vec();
        run_blocking(move || store.save_raw(&key, &bytes)).await
    }

    async fn load_raw_async(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let store = self.clone();
        let key = key.to_string();
        run_blocking(move || store.load_raw(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("saves"), "dat").unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("a").join("b");
        assert!(!root.exists());

        let store = FileStore::open(&root, "dat").unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
        assert_eq!(store.extension(), "dat");
    }

    #[test]
    fn test_open_rejects_unusable_extensions() {
        let dir = TempDir::new().unwrap();
        for extension in ["", ".dat", "sav.json", "tmp", "a/b", "a\\b", "d:t"] {
            match FileStore::open(dir.path(), extension) {
                Err(StoreError::InvalidExtension { extension: rejected, .. }) => {
                    assert_eq!(rejected, extension);
                }
                other => panic!("{:?} accepted: {:?}", extension, other.map(|s| s.root().to_path_buf())),
            }
        }
    }

    #[test]
    fn test_keys_and_clear_see_every_saved_record() {
        let dir = TempDir::new().unwrap();
        for extension in ["dat", "json", "sav_1"] {
            let store = FileStore::open(dir.path().join(extension), extension).unwrap();
            store.save_raw("p1", b"one").unwrap();
            store.save_raw("game.player", b"two").unwrap();

            assert_eq!(store.keys().unwrap(), vec!["game.player", "p1"]);
            assert_eq!(store.clear().unwrap(), 2);
            assert!(!store.exists("p1").unwrap());
        }
    }

    #[test]
    fn test_path_for_sanitizes() {
        let (_dir, store) = open_store();
        let path = store.path_for("slot/1").unwrap();
        assert_eq!(path, store.root().join("slot_1.dat"));
        assert!(store.path_for("").is_err());
        assert!(store.path_for("..").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = open_store();
        store.save_raw("p1", b"hello").unwrap();

        assert_eq!(store.load_raw("p1").unwrap(), Some(b"hello".to_vec()));
        assert!(store.exists("p1").unwrap());
        assert!(store.root().join("p1.dat").is_file());
    }

    #[test]
    fn test_absent_key() {
        let (_dir, store) = open_store();

        assert_eq!(store.load_raw("missing").unwrap(), None);
        assert!(!store.exists("missing").unwrap());
        assert!(!store.delete("missing").unwrap());
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let (_dir, store) = open_store();
        store.save_raw("k", b"first version").unwrap();
        store.save_raw("k", b"v2").unwrap();

        assert_eq!(store.load_raw("k").unwrap(), Some(b"v2".to_vec()));
        let names: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.dat".to_string()]);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = open_store();
        store.save_raw("k", b"v").unwrap();

        assert!(store.delete("k").unwrap());
        assert!(!store.exists("k").unwrap());
        assert!(!store.root().join("k.dat").exists());
    }

    #[test]
    fn test_keys_ignore_foreign_files() {
        let (_dir, store) = open_store();
        store.save_raw("b", b"2").unwrap();
        store.save_raw("a.v2", b"1").unwrap();
        fs::write(store.root().join("notes.txt"), b"x").unwrap();
        fs::write(store.root().join("c.dat.tmp"), b"partial").unwrap();
        fs::create_dir(store.root().join("sub.dat")).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["a.v2", "b"]);
    }

    #[test]
    fn test_clear() {
        let (_dir, store) = open_store();
        for i in 0..5 {
            store.save_raw(&format!("k{}", i), b"v").unwrap();
        }
        fs::write(store.root().join("keep.txt"), b"x").unwrap();

        assert_eq!(store.clear().unwrap(), 5);
        assert!(store.keys().unwrap().is_empty());
        assert!(store.root().join("keep.txt").exists());
    }

    #[test]
    fn test_reopen_sees_records() {
        let (dir, store) = open_store();
        store.save_raw("persisted", b"across handles").unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path().join("saves"), "dat").unwrap();
        assert_eq!(
            reopened.load_raw("persisted").unwrap(),
            Some(b"across handles".to_vec())
        );
    }

    #[test]
    fn test_concurrent_writes_are_never_partial() {
        let (_dir, store) = open_store();
        let a = vec![b'a'; 64 * 1024];
        let b = vec![b'b'; 32 * 1024];

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                let payload = if t % 2 == 0 { a.clone() } else { b.clone() };
                thread::spawn(move || {
                    for _ in 0..20 {
                        store.save_raw("shared", &payload).unwrap();
                        store.save_raw(&format!("own{}", t), &payload).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..50 {
            if let Some(bytes) = store.load_raw("shared").unwrap() {
                assert!(bytes == a || bytes == b, "observed a partial record");
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let last = store.load_raw("shared").unwrap().unwrap();
        assert!(last == a || last == b);
        assert_eq!(store.keys().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let (_dir, store) = open_store();
        store.save_raw_async("k", b"v").await.unwrap();

        assert_eq!(store.load_raw("k").unwrap(), Some(b"v".to_vec()));
        assert!(store.exists_async("k").await.unwrap());
        assert_eq!(store.load_raw_async("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(store.delete_async("k").await.unwrap());
        assert!(!store.delete_async("k").await.unwrap());
        assert_eq!(store.load_raw_async("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_async_invalid_key() {
        let (_dir, store) = open_store();
        let result = store.save_raw_async("", b"v").await;
        assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
    }
}

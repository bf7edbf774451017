//! Filesystem key-value backend with sharded directories.
//!
//! Each entry is one file. Keys are arbitrary bytes, so the filename is the
//! SHA-256 of the key rather than the key itself, and the first two bytes
//! of that hash select a two-level shard:
//!
//! ```text
//! {root}/entries/{xx}/{yy}/{sha256(key)}.entry
//! ```
//!
//! Every write goes to a uniquely named temp file in the entry's shard and
//! is renamed into place, so a reader never observes a partially written
//! entry. Writers hold an exclusive OS lock on `{root}/store.lock`, which
//! serializes them across every `FileStore` opened on the same directory,
//! in this process or another. The same lock makes
//! [`compare_and_swap`](KeyValueStore::compare_and_swap) atomic.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, trace};

use crate::error::BackendError;
use crate::kv::KeyValueStore;

const LOCK_FILE: &str = "store.lock";

/// Durable key-value backend rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open a store, creating `{root_dir}/entries` if needed.
    ///
    /// Any number of stores may be open on one directory at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let root_dir = root_dir.into();
        fs::create_dir_all(root_dir.join("entries")).await?;
        debug!(root = %root_dir.display(), "opened file store");
        Ok(Self { root_dir })
    }

    /// The root directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the file holding the entry for `key`.
    pub fn entry_path(&self, key: &[u8]) -> PathBuf {
        let hash = Sha256::digest(key);
        let name: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        self.root_dir
            .join("entries")
            .join(&name[0..2])
            .join(&name[2..4])
            .join(format!("{name}.entry"))
    }

    /// Run `op` on a blocking thread while holding the store lock.
    async fn with_write_lock<R, F>(&self, op: F) -> Result<R, BackendError>
    where
        F: FnOnce() -> io::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let lock_path = self.root_dir.join(LOCK_FILE);
        let result = tokio::task::spawn_blocking(move || {
            let lock = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            lock.lock_exclusive()?;
            // Closing the handle releases the lock.
            let result = op();
            drop(lock);
            result
        })
        .await
        .map_err(|e| BackendError::Unavailable(format!("file store task failed: {e}")))?;
        Ok(result?)
    }
}

fn read_entry(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Unique temp file in the shard, fsync, then rename over the entry.
fn write_entry(path: &Path, value: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "entry path has no parent"))?;
    std::fs::create_dir_all(parent)?;
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(value)?;
    temp.as_file().sync_all()?;
    let file: File = temp.persist(path)?;
    drop(file);
    trace!(path = %path.display(), bytes = value.len(), "wrote entry");
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), BackendError> {
        let path = self.entry_path(key);
        self.with_write_lock(move || write_entry(&path, &value)).await
    }

    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        let path = self.entry_path(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<bool, BackendError> {
        let path = self.entry_path(key);
        let expected = expected.map(<[u8]>::to_vec);
        self.with_write_lock(move || {
            if read_entry(&path)? != expected {
                return Ok(false);
            }
            write_entry(&path, &value)?;
            Ok(true)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = FileStore::open(temp_dir.path()).await.expect("open store");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn put_and_get() {
        let (store, _temp) = create_test_store().await;
        store.put(b"key", b"value".to_vec()).await.unwrap();
        assert_eq!(store.get(b"key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let (store, _temp) = create_test_store().await;
        assert!(store.get(b"nonexistent-key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_and_leaves_no_temp_files() {
        let (store, _temp) = create_test_store().await;
        store.put(b"key", b"first".to_vec()).await.unwrap();
        store.put(b"key", b"second".to_vec()).await.unwrap();
        assert_eq!(store.get(b"key").await.unwrap(), Some(b"second".to_vec()));

        let path = store.entry_path(b"key");
        let shard: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(shard, vec![path]);
    }

    #[tokio::test]
    async fn entry_path_is_sharded() {
        let (store, temp) = create_test_store().await;
        let path = store.entry_path(b"some key");
        let rel = path.strip_prefix(temp.path()).unwrap();
        let parts: Vec<_> = rel.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "entries");
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
        assert!(parts[3].starts_with(&format!("{}{}", parts[1], parts[2])));
        assert!(parts[3].ends_with(".entry"));
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = FileStore::open(temp.path()).await.unwrap();
            store.put(b"durable", b"yes".to_vec()).await.unwrap();
        }
        let store = FileStore::open(temp.path()).await.unwrap();
        assert_eq!(store.get(b"durable").await.unwrap(), Some(b"yes".to_vec()));
        assert_eq!(store.root_dir(), temp.path());
    }

    #[tokio::test]
    async fn compare_and_swap_semantics() {
        let (store, _temp) = create_test_store().await;
        assert!(store.compare_and_swap(b"k", None, b"v1".to_vec()).await.unwrap());
        assert!(!store.compare_and_swap(b"k", None, b"v2".to_vec()).await.unwrap());
        assert!(!store
            .compare_and_swap(b"k", Some(b"other"), b"v2".to_vec())
            .await
            .unwrap());
        assert!(store
            .compare_and_swap(b"k", Some(b"v1"), b"v2".to_vec())
            .await
            .unwrap());
        assert_eq!(store.get(b"k").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn open_creates_nested_root() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("deep").join("nested");
        let store = FileStore::open(&nested).await.unwrap();
        assert!(nested.join("entries").is_dir());
        store.put(b"k", b"v".to_vec()).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stores_sharing_a_directory_never_tear_entries() {
        let temp = TempDir::new().unwrap();
        let mut stores = Vec::new();
        for _ in 0..4 {
            stores.push(Arc::new(FileStore::open(temp.path()).await.unwrap()));
        }

        let mut handles = Vec::new();
        for i in 0..32u8 {
            let store = Arc::clone(&stores[usize::from(i) % stores.len()]);
            handles.push(tokio::spawn(async move {
                store.put(b"shared", vec![i; 64 * 1024]).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let value = stores[0].get(b"shared").await.unwrap().unwrap();
        assert_eq!(value.len(), 64 * 1024);
        assert!(value.iter().all(|b| *b == value[0]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn compare_and_swap_is_atomic_across_stores() {
        let temp = TempDir::new().unwrap();
        let a = Arc::new(FileStore::open(temp.path()).await.unwrap());
        let b = Arc::new(FileStore::open(temp.path()).await.unwrap());

        // Every task tries to claim the empty slot; exactly one may win.
        let mut handles = Vec::new();
        for i in 0..16u8 {
            let store = if i % 2 == 0 { Arc::clone(&a) } else { Arc::clone(&b) };
            handles.push(tokio::spawn(async move {
                store.compare_and_swap(b"slot", None, vec![i]).await
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}

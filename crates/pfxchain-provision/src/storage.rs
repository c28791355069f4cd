//! Key/value blob stores for generated bundles.

use async_trait::async_trait;
use pfxchain_core::{ChainError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::debug;

/// Persistent store for generated bundles.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns true if `key` has a stored value
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Load the value for `key`, or [`ChainError::NotFound`]
    async fn load(&self, key: &str) -> Result<Vec<u8>>;

    /// Store `data` under `key`, replacing any previous value
    async fn store(&self, key: &str, data: &[u8]) -> Result<()>;
}

#[async_trait]
impl<S: BlobStore + ?Sized> BlobStore for Arc<S> {
    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (**self).load(key).await
    }

    async fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).store(key, data).await
    }
}

/// Directory-backed store. Keys map to relative paths below the root.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Store files below `root`, created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key.
    ///
    /// Path separators in the key become directories; root, parent and
    /// current-directory components are dropped so a key can never escape
    /// the root.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in Path::new(key).components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }
}

#[async_trait]
impl BlobStore for FileStorage {
    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ChainError::io(path, e)),
        }
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ChainError::NotFound(key.to_string()))
            }
            Err(e) => Err(ChainError::io(path, e)),
        }
    }

    async fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let parent = path
            .parent()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| ChainError::io(&parent, e))?;

        // Unique temp file beside the target, renamed over it once complete.
        let bytes = data.len();
        let data = data.to_vec();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| ChainError::io(&parent, e))?;
            tmp.write_all(&data)
                .and_then(|()| tmp.as_file().sync_all())
                .map_err(|e| ChainError::io(tmp.path(), e))?;
            tmp.persist(&target)
                .map_err(|e| ChainError::io(&target, e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| ChainError::Internal(format!("bundle write task failed: {e}")))??;

        debug!(path = %path.display(), bytes, "stored blob");
        Ok(())
    }
}

/// In-process store, mainly for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Returns true if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryStorage {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.read().await.contains_key(key))
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ChainError::NotFound(key.to_string()))
    }

    async fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        self.blobs
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "/etc/ssl/site.pfx.2024-05-01T10:00:00Z-fullchain+pkey.pem";

    #[tokio::test]
    async fn file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(!storage.exists(KEY).await.unwrap());
        storage.store(KEY, b"bundle").await.unwrap();
        assert!(storage.exists(KEY).await.unwrap());
        assert_eq!(storage.load(KEY).await.unwrap(), b"bundle");

        storage.store(KEY, b"replaced").await.unwrap();
        assert_eq!(storage.load(KEY).await.unwrap(), b"replaced");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_to_one_key_all_succeed() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));

        let writers: Vec<_> = (0..16_u8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move { storage.store("site.pem", &[i; 4096]).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let stored = storage.load("site.pem").await.unwrap();
        assert_eq!(stored.len(), 4096);
        assert!(stored.iter().all(|&b| b == stored[0]));

        // No temp files left behind
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn file_storage_missing_key() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        let err = storage.load("absent.pem").await.unwrap_err();
        assert!(matches!(err, ChainError::NotFound(_)));
    }

    #[test]
    fn keys_stay_below_root() {
        let storage = FileStorage::new("/var/cache/pfxchain");
        assert_eq!(
            storage.path_for("../../etc/passwd"),
            PathBuf::from("/var/cache/pfxchain/etc/passwd")
        );
        assert_eq!(
            storage.path_for("/etc/ssl/site.pfx.pem"),
            PathBuf::from("/var/cache/pfxchain/etc/ssl/site.pfx.pem")
        );
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty().await);
        assert!(matches!(
            storage.load(KEY).await.unwrap_err(),
            ChainError::NotFound(_)
        ));

        storage.store(KEY, b"bundle").await.unwrap();
        assert!(storage.exists(KEY).await.unwrap());
        assert_eq!(storage.load(KEY).await.unwrap(), b"bundle");
        assert_eq!(storage.len().await, 1);
    }
}

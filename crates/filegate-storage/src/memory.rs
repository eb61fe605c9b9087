//! In-memory storage backend
//!
//! Keeps files and directories in maps instead of on disk. Used to test code
//! built on the `Storage` trait without a real file system, and records how many
//! operations were performed so tests can assert that nothing was touched.

use crate::paths::StoragePath;
use crate::traits::{Storage, StorageError, StorageReader, StorageResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    dirs: HashSet<StoragePath>,
    files: HashMap<StoragePath, Vec<u8>>,
}

/// In-memory storage implementation
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
    operations: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait operations performed so far
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Contents of a stored file
    pub async fn read(&self, path: &StoragePath) -> Option<Vec<u8>> {
        self.inner.read().await.files.get(path).cloned()
    }

    pub async fn dir_exists(&self, dir: &StoragePath) -> bool {
        dir.is_root() || self.inner.read().await.dirs.contains(dir)
    }

    pub async fn file_count(&self) -> usize {
        self.inner.read().await.files.len()
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

fn parent_of(path: &StoragePath) -> StorageResult<StoragePath> {
    let segments = path.segments();
    let parent = &segments[..segments.len().saturating_sub(1)];
    StoragePath::from_segments(parent)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_dir(&self, dir: &StoragePath) -> StorageResult<()> {
        self.record();
        let mut inner = self.inner.write().await;
        let mut current = StoragePath::root();
        for segment in dir.segments() {
            current = current.join(segment)?;
            if inner.files.contains_key(&current) {
                return Err(StorageError::UploadFailed(format!(
                    "{} exists and is not a directory",
                    current
                )));
            }
            inner.dirs.insert(current.clone());
        }
        Ok(())
    }

    async fn write_stream(&self, path: &StoragePath, mut reader: StorageReader) -> StorageResult<u64> {
        self.record();
        if path.is_root() {
            return Err(StorageError::InvalidKey("cannot write to the storage root".to_string()));
        }

        let parent = parent_of(path)?;
        if !self.dir_exists(&parent).await {
            return Err(StorageError::UploadFailed(format!(
                "Parent directory {} does not exist",
                parent
            )));
        }

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read stream for {}: {}", path, e))
        })?;
        let size = data.len() as u64;

        let mut inner = self.inner.write().await;
        if inner.dirs.contains(path) {
            return Err(StorageError::UploadFailed(format!("{} is a directory", path)));
        }
        inner.files.insert(path.clone(), data);
        Ok(size)
    }

    async fn is_file(&self, path: &StoragePath) -> StorageResult<bool> {
        self.record();
        Ok(self.inner.read().await.files.contains_key(path))
    }

    async fn delete(&self, path: &StoragePath) -> StorageResult<()> {
        self.record();
        match self.inner.write().await.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(segments: &[&str]) -> StoragePath {
        StoragePath::from_segments(segments).unwrap()
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        let dir = key(&["upload", "banner"]);
        storage.create_dir(&dir).await.unwrap();

        let file = dir.join("a.png").unwrap();
        let written = storage
            .write_stream(&file, Box::pin(std::io::Cursor::new(b"abc".to_vec())))
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(storage.read(&file).await.unwrap(), b"abc");

        storage.delete(&file).await.unwrap();
        assert!(matches!(
            storage.delete(&file).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(storage.operation_count(), 4);
    }

    #[tokio::test]
    async fn test_write_requires_parent_directory() {
        let storage = MemoryStorage::new();
        let result = storage
            .write_stream(
                &key(&["upload", "a.pdf"]),
                Box::pin(std::io::Cursor::new(b"x".to_vec())),
            )
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}

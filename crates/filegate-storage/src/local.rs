use crate::paths::StoragePath;
use crate::traits::{Storage, StorageError, StorageReader, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Storage root (web root), e.g. "/var/lib/filegate/wwwroot".
    ///   Created if missing.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert a storage path to a filesystem path with containment validation
    ///
    /// The deepest existing ancestor of the target is canonicalized and must
    /// remain under the canonical storage root, so symlinks inside the root
    /// cannot redirect reads, writes or deletes outside of it.
    async fn key_to_path(&self, key: &StoragePath) -> StorageResult<PathBuf> {
        let path = key.resolve(&self.base_path);

        let base_canonical = fs::canonicalize(&self.base_path).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        let mut existing: &Path = path.as_path();
        while !fs::try_exists(existing).await? {
            match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            }
        }

        let canonical = fs::canonicalize(existing).await.map_err(|e| {
            StorageError::InvalidKey(format!("Failed to resolve {}: {}", key, e))
        })?;

        if canonical.strip_prefix(&base_canonical).is_err() {
            return Err(StorageError::InvalidKey(format!(
                "{} resolves outside storage directory",
                key
            )));
        }

        Ok(path)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn create_dir(&self, dir: &StoragePath) -> StorageResult<()> {
        let path = self.key_to_path(dir).await?;
        fs::create_dir_all(&path).await?;
        // Re-check now that the directories exist
        self.key_to_path(dir).await?;
        tracing::debug!(path = %path.display(), "Storage directory ready");
        Ok(())
    }

    async fn write_stream(&self, key: &StoragePath, mut reader: StorageReader) -> StorageResult<u64> {
        let path = self.key_to_path(key).await?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(bytes_copied)
    }

    async fn is_file(&self, key: &StoragePath) -> StorageResult<bool> {
        let path = self.key_to_path(key).await?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn delete(&self, key: &StoragePath) -> StorageResult<()> {
        let path = self.key_to_path(key).await?;
        let start = std::time::Instant::now();

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }
}

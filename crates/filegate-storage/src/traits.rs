//! Storage abstraction trait
//!
//! This module defines the narrow file-system capability the file operations
//! depend on. Sanitization, whitelisting and authorization never touch a
//! backend directly, so they can be exercised against `MemoryStorage`.

use crate::paths::StoragePath;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte source for streamed uploads
pub type StorageReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage capability
///
/// Every path is relative to the backend's storage root. Implementations must
/// refuse any path that would resolve outside that root with `InvalidKey`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create a directory and its parents. Creating an existing directory is a no-op.
    async fn create_dir(&self, dir: &StoragePath) -> StorageResult<()>;

    /// Write the reader to `path` until EOF, replacing any existing file.
    ///
    /// Returns the number of bytes written. An interrupted copy may leave a
    /// truncated file behind; there is no rollback.
    async fn write_stream(&self, path: &StoragePath, reader: StorageReader) -> StorageResult<u64>;

    /// Whether `path` names an existing regular file
    async fn is_file(&self, path: &StoragePath) -> StorageResult<bool>;

    /// Delete the file at `path`. Fails with `NotFound` if it does not exist.
    async fn delete(&self, path: &StoragePath) -> StorageResult<()>;
}

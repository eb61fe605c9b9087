//! Upload and delete orchestration
//!
//! `FileOperation` composes the whitelist, the path rules and the storage
//! backend. Every rejection happens before the backend is touched, with the
//! exception of missing delete targets, which need a lookup to detect.

use bytes::Bytes;
use filegate_core::{html_encode, AppError, ExtensionWhitelist};
use filegate_storage::{relative_url, sanitize, Storage, StorageError, StoragePath, StorageReader};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use thiserror::Error;

/// An incoming file: client-supplied name, declared length and content
pub struct UploadRequest {
    pub file_name: String,
    pub byte_length: u64,
    pub content: StorageReader,
}

impl UploadRequest {
    pub fn from_bytes(file_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            byte_length: data.len() as u64,
            content: Box::pin(std::io::Cursor::new(data)),
        }
    }
}

/// Why a request was refused. All reasons surface to clients as the same bare 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyUpload,
    ExtensionNotPermitted,
    InvalidFileName,
    InvalidDirectory,
    NotAuthorized,
    InvalidPath,
    NotFound,
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let reason = match self {
            RejectReason::EmptyUpload => "no file or empty file",
            RejectReason::ExtensionNotPermitted => "file extension not permitted",
            RejectReason::InvalidFileName => "file name is not a plain name",
            RejectReason::InvalidDirectory => "invalid upload directory",
            RejectReason::NotAuthorized => "not authorized for this path",
            RejectReason::InvalidPath => "path escapes the storage root",
            RejectReason::NotFound => "file not found",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error("Request rejected: {0}")]
    Rejected(RejectReason),

    #[error(transparent)]
    Storage(StorageError),
}

impl FileOperationError {
    fn from_storage(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(_) => FileOperationError::Rejected(RejectReason::InvalidPath),
            StorageError::NotFound(_) => FileOperationError::Rejected(RejectReason::NotFound),
            other => FileOperationError::Storage(other),
        }
    }
}

impl From<FileOperationError> for AppError {
    fn from(err: FileOperationError) -> Self {
        match err {
            FileOperationError::Rejected(reason) => AppError::BadRequest(reason.to_string()),
            FileOperationError::Storage(StorageError::ConfigError(msg)) => AppError::Internal(msg),
            FileOperationError::Storage(err) => AppError::Storage(err.to_string()),
        }
    }
}

impl From<FileOperationError> for crate::error::HttpAppError {
    fn from(err: FileOperationError) -> Self {
        crate::error::HttpAppError(err.into())
    }
}

/// File upload and delete against one storage root
#[derive(Clone)]
pub struct FileOperation {
    storage: Arc<dyn Storage>,
    path_base: String,
}

impl FileOperation {
    /// `path_base` is the URL prefix the service is mounted under; it is put in
    /// front of returned URLs and stripped from URLs sent back for deletion.
    pub fn new(storage: Arc<dyn Storage>, path_base: impl Into<String>) -> Self {
        Self {
            storage,
            path_base: path_base.into(),
        }
    }

    /// Store an upload under `segments` and return its relative URL.
    ///
    /// An existing file with the same name is overwritten. The file name is
    /// HTML-encoded in the returned URL only; it is stored verbatim.
    pub async fn upload_file(
        &self,
        request: UploadRequest,
        segments: &[String],
        whitelist: &ExtensionWhitelist,
    ) -> Result<String, FileOperationError> {
        let UploadRequest {
            file_name,
            byte_length,
            content,
        } = request;

        if file_name.is_empty() || byte_length == 0 {
            return Err(FileOperationError::Rejected(RejectReason::EmptyUpload));
        }

        if !whitelist.is_permitted(&file_name) {
            tracing::debug!(file_name = %file_name, allowed = %whitelist, "Extension not permitted");
            return Err(FileOperationError::Rejected(
                RejectReason::ExtensionNotPermitted,
            ));
        }

        let dir = StoragePath::from_segments(segments)
            .map_err(|_| FileOperationError::Rejected(RejectReason::InvalidDirectory))?;
        let target = dir
            .join(&file_name)
            .map_err(|_| FileOperationError::Rejected(RejectReason::InvalidFileName))?;

        self.storage
            .create_dir(&dir)
            .await
            .map_err(FileOperationError::from_storage)?;
        let written = self
            .storage
            .write_stream(&target, content)
            .await
            .map_err(FileOperationError::from_storage)?;

        if written != byte_length {
            tracing::warn!(
                path = %target,
                declared = byte_length,
                written,
                "Upload length differs from declared length"
            );
        }

        let url = relative_url(&self.path_base, &dir, &html_encode(&file_name));
        tracing::info!(path = %target, size_bytes = written, url = %url, "File uploaded");
        Ok(url)
    }

    /// Delete the file a relative URL points at and return the cleaned URL.
    ///
    /// `authorize` sees the URL exactly as the client sent it.
    pub async fn delete_file<F>(
        &self,
        authorize: F,
        raw_relative_url: &str,
    ) -> Result<String, FileOperationError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !authorize(raw_relative_url) {
            tracing::debug!(url = %raw_relative_url, "Delete not authorized");
            return Err(FileOperationError::Rejected(RejectReason::NotAuthorized));
        }

        let sanitized = sanitize(raw_relative_url, &self.path_base)
            .map_err(|_| FileOperationError::Rejected(RejectReason::InvalidPath))?;

        let exists = self
            .storage
            .is_file(&sanitized.path)
            .await
            .map_err(FileOperationError::from_storage)?;
        if !exists {
            return Err(FileOperationError::Rejected(RejectReason::NotFound));
        }

        self.storage
            .delete(&sanitized.path)
            .await
            .map_err(FileOperationError::from_storage)?;

        tracing::info!(path = %sanitized.path, "File deleted");
        Ok(sanitized.cleaned_url)
    }
}

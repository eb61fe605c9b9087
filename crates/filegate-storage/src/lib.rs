//! Filegate Storage Library
//!
//! This crate provides the storage capability used by the file operations:
//! the `Storage` trait, the local filesystem backend, and the path rules that
//! turn untrusted input into validated storage paths.
//!
//! # Storage layout
//!
//! All paths are relative to a single storage root (the web root):
//!
//! - **Banners**: `upload/banner/{file_name}`
//! - **General files**: `upload/{identity_id}/{yyyy-MM-dd}/{file_name}`
//!
//! A `StoragePath` never contains empty, `.` or `..` segments, or separators
//! inside a segment. Backends additionally verify that the resolved location
//! stays under the storage root.

#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod paths;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use paths::{
    banner_segments, build_path, file_segments, relative_url, sanitize, SanitizedPath,
    StoragePath, BANNER_DIR, UPLOAD_DIR,
};
pub use traits::{Storage, StorageError, StorageReader, StorageResult};

//! Filegate API Library
//!
//! HTTP endpoints for uploading and deleting files under a storage root:
//! banners (admin only) and per-identity general files.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{FileOperation, FileOperationError, RejectReason, UploadRequest};

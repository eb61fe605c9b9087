//! Filegate Core Library
//!
//! This crate provides the error types, configuration, caller identity and
//! upload validation rules shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BearerConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::Caller;
pub use validation::{html_encode, ExtensionWhitelist};

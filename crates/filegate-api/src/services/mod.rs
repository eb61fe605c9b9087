pub mod file_operation;

pub use file_operation::{FileOperation, FileOperationError, RejectReason, UploadRequest};

//! Multipart extraction for upload handlers

use crate::services::UploadRequest;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use filegate_core::AppError;

/// Form field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

fn read_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, e))
    } else {
        AppError::BadRequest(format!("{}: {}", context, e))
    }
}

/// Extract the `file` field of a multipart form as an upload.
/// Only one field named "file" is accepted; other fields are ignored.
pub async fn extract_upload(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut upload: Option<UploadRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error("Failed to read multipart", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let file_name = field.file_name().map(str::to_string).unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| read_error("Failed to read file data", e))?;

        upload = Some(UploadRequest::from_bytes(file_name, data));
    }

    upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
}

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use filegate_core::AppError;
use filegate_storage::file_segments;

use crate::auth::models::AuthCaller;
use crate::auth::policy::file_delete_allowed;
use crate::error::HttpAppError;
use crate::handlers::DeleteQuery;
use crate::state::AppState;
use crate::utils::upload::extract_upload;

/// Upload a general file to `upload/{caller id}/{today}`
///
/// Any authenticated caller may upload. Responds 201 with the relative URL of
/// the stored file as a JSON string.
#[tracing::instrument(
    skip(state, multipart),
    fields(caller_id = %caller.id, operation = "upload_file")
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let upload = extract_upload(multipart).await?;

    let segments = file_segments(&caller.id, Local::now().date_naive());
    let url = state
        .operation
        .upload_file(upload, &segments, &state.config.file_allowed_extensions)
        .await?;

    Ok((StatusCode::CREATED, Json(url)).into_response())
}

/// Delete a general file by its relative URL
///
/// Owners may delete URLs containing their id; callers with any role may
/// delete any file under `upload/`.
#[tracing::instrument(
    skip(state, query),
    fields(caller_id = %caller.id, operation = "delete_file")
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<String>, HttpAppError> {
    let cleaned = state
        .operation
        .delete_file(
            |url| file_delete_allowed(&caller, url),
            &query.relative_url,
        )
        .await?;

    Ok(Json(cleaned))
}

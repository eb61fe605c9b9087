use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filegate_core::AppError;
use filegate_storage::banner_segments;

use crate::auth::models::AuthCaller;
use crate::auth::policy::banner_delete_allowed;
use crate::error::HttpAppError;
use crate::handlers::DeleteQuery;
use crate::state::AppState;
use crate::utils::upload::extract_upload;

/// Upload a banner image to `upload/banner`
///
/// Requires the admin role (enforced by the router). Responds 201 with the
/// relative URL of the stored file as a JSON string.
#[tracing::instrument(
    skip(state, multipart),
    fields(caller_id = %caller.id, operation = "upload_banner")
)]
pub async fn upload_banner(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let upload = extract_upload(multipart).await?;

    let url = state
        .operation
        .upload_file(
            upload,
            &banner_segments(),
            &state.config.banner_allowed_extensions,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(url)).into_response())
}

/// Delete a banner by its relative URL
#[tracing::instrument(
    skip(state, query),
    fields(caller_id = %caller.id, operation = "delete_banner")
)]
pub async fn delete_banner(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<String>, HttpAppError> {
    let cleaned = state
        .operation
        .delete_file(banner_delete_allowed, &query.relative_url)
        .await?;

    Ok(Json(cleaned))
}

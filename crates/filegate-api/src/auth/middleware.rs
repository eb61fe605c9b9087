use crate::auth::jwt::JwtService;
use crate::auth::models::AuthCaller;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use filegate_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtService>,
}

/// Role a caller must hold to pass `require_role`
#[derive(Clone)]
pub struct RoleRequirement {
    pub role: String,
}

fn unauthorized(message: &str) -> Response {
    let mut response = HttpAppError(AppError::Unauthorized(message.to_string())).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

fn bearer_token(request: &Request) -> Result<&str, &'static str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or("Missing authorization header")?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or("Invalid authorization header format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

/// Authenticates the bearer token and stores the caller in request extensions
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Ok(token) => token.to_string(),
        Err(reason) => {
            tracing::debug!(reason, "Authentication failed");
            return unauthorized(reason);
        }
    };

    let claims = match auth_state.jwt.validate_token(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Authentication failed");
            return unauthorized("Invalid or expired token");
        }
    };

    let caller = claims.into_caller();
    tracing::debug!(caller_id = %caller.id, role = ?caller.role(), "Authenticated caller");
    request.extensions_mut().insert(AuthCaller(caller));

    next.run(request).await
}

/// Rejects authenticated callers that lack the required role with 403
pub async fn require_role(
    State(requirement): State<Arc<RoleRequirement>>,
    request: Request,
    next: Next,
) -> Response {
    let allowed = request
        .extensions()
        .get::<AuthCaller>()
        .map(|AuthCaller(caller)| caller.has_role(&requirement.role));

    match allowed {
        Some(true) => next.run(request).await,
        Some(false) => HttpAppError(AppError::Forbidden(format!(
            "Role '{}' required",
            requirement.role
        )))
        .into_response(),
        None => unauthorized("Missing caller identity"),
    }
}

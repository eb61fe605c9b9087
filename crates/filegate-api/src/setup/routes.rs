use crate::auth::{auth_middleware, require_role, AuthState, RoleRequirement};
use crate::constants::{BANNER_ROUTE, FILE_ROUTE, HEALTH_ROUTE, UPLOAD_ROUTE};
use crate::handlers::{banner, file, health};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use filegate_core::Config;
use filegate_storage::{build_path, UPLOAD_DIR};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Allowance for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let auth_state = Arc::new(AuthState {
        jwt: state.jwt.clone(),
    });
    let admin_requirement = Arc::new(RoleRequirement {
        role: config.admin_role.clone(),
    });

    // Role check runs after authentication: layers added later wrap earlier ones.
    let banner_routes = Router::new()
        .route(
            BANNER_ROUTE,
            post(banner::upload_banner).delete(banner::delete_banner),
        )
        .layer(from_fn_with_state(admin_requirement, require_role));

    let file_routes = Router::new().route(
        FILE_ROUTE,
        post(file::upload_file).delete(file::delete_file),
    );

    let protected_routes = banner_routes
        .merge(file_routes)
        .layer(from_fn_with_state(auth_state, auth_middleware));

    let mut public_routes = Router::new().route(HEALTH_ROUTE, get(health::health));
    if config.serve_uploads {
        let upload_dir = build_path(&config.web_root, [UPLOAD_DIR])?;
        tracing::info!(dir = %upload_dir.display(), "Serving uploads read-only");
        public_routes = public_routes.nest_service(UPLOAD_ROUTE, ServeDir::new(upload_dir));
    }

    let api = public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    let app = if config.base_path.is_empty() {
        api
    } else {
        tracing::info!(base_path = %config.base_path, "Mounting routes under base path");
        Router::new().nest(&config.base_path, api)
    };

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    Ok(app
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any))
}

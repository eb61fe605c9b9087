//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::JwtService;
use crate::services::FileOperation;
use crate::state::AppState;
use anyhow::{Context, Result};
use filegate_core::Config;
use std::sync::Arc;

/// Initialize telemetry, then build state and routes
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .context("Failed to initialize telemetry")?;

    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    build_app(config).await
}

/// Build state and routes without touching global telemetry
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let storage = storage::setup_storage(&config).await?;
    let jwt = JwtService::from_config(&config.bearer).context("Failed to set up bearer auth")?;

    let state = Arc::new(AppState {
        operation: FileOperation::new(storage, config.base_path.clone()),
        jwt: Arc::new(jwt),
        config: Arc::new(config),
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

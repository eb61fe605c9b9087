//! Storage setup and initialization

use anyhow::{Context, Result};
use filegate_core::Config;
use filegate_storage::{LocalStorage, Storage};
use std::sync::Arc;

/// Open the local storage root, creating it when missing
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(web_root = %config.web_root.display(), "Initializing local storage...");
    let storage = LocalStorage::new(&config.web_root)
        .await
        .context("Failed to initialize local storage")?;
    tracing::info!("Local storage initialized successfully");
    Ok(Arc::new(storage))
}

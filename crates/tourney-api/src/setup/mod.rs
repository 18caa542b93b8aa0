//! Application setup and initialization
//!
//! Kept out of main.rs so integration tests can build the same router.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tourney_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration, also when the config was not built from the environment
    config
        .validate()
        .context("Configuration validation failed")?;

    let (staging, store) = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), staging, store));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

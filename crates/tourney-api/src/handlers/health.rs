use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub staging: String,
    pub storage: String,
}

/// Health check
///
/// Healthy when both upload roots exist and are directories.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "An upload root is missing", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let staging = check_dir(state.staging.root()).await;
    let storage = check_dir(state.store.root()).await;

    let healthy = staging.is_ok() && storage.is_ok();
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        staging: describe(&staging),
        storage: describe(&storage),
    };

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        tracing::error!(
            staging = %response.staging,
            storage = %response.storage,
            "Health check failed"
        );
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

async fn check_dir(path: &Path) -> Result<(), String> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(format!("{} is not a directory", path.display())),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn describe(result: &Result<(), String>) -> String {
    match result {
        Ok(()) => "healthy".to_string(),
        Err(e) => format!("unhealthy: {}", e),
    }
}

//! Route configuration and setup

use crate::api_doc::get_openapi_spec;
use crate::constants::{API_PREFIX, OPENAPI_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tourney_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config);
    let body_limit = request_body_limit(config);

    tracing::info!(body_limit_bytes = body_limit, "Request body limit configured");

    let app = Router::new()
        .route(
            &format!("{}/{{entity}}/upload/{{field}}", API_PREFIX),
            post(handlers::upload::upload_file),
        )
        .route("/health", get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(get_openapi_spec()) }))
        // Multipart reads are capped by DefaultBodyLimit, not by the per-field limit
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Twice the per-field limit, so an oversized file still reaches the intake and
/// gets its field error instead of a bare 413.
fn request_body_limit(config: &Config) -> usize {
    usize::try_from(config.max_file_size_bytes.saturating_mul(2)).unwrap_or(usize::MAX)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> CorsLayer {
    if !config.is_production() {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

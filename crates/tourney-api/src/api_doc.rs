//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services::upload::UploadResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tourney Admin API",
        version = "0.1.0",
        description = "Admin upload endpoints of the tournament service. Files are staged by the upload endpoint and committed by the create/update flow that references them."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::health::health_check,
    ),
    components(schemas(
        UploadResponse,
        error::ErrorResponse,
        handlers::health::HealthResponse,
        tourney_core::EntityName,
    )),
    tags(
        (name = "uploads", description = "Staged file uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

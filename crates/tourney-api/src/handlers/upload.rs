use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadResponse;
use crate::state::AppState;

/// Upload a file for an entity field
///
/// Streams the multipart part named `{field}` into the staging area and returns
/// the generated filename. The file is committed later by the create/update flow
/// that references it; uncommitted files are removed by the temp file sweep.
///
/// # Errors
/// - `AppError::NotFound` - unknown entity or field
/// - `AppError::InvalidInput` - body is not valid multipart
/// - `AppError::Validation` - missing, empty, oversized or disallowed file
#[utoipa::path(
    post,
    path = "/api/admin/{entity}/upload/{field}",
    tag = "uploads",
    params(
        ("entity" = String, Path, description = "Entity name: teams, users or tournaments"),
        ("field" = String, Path, description = "Upload field of the entity, e.g. flagIcon")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File staged", body = UploadResponse),
        (status = 400, description = "Invalid multipart body", body = ErrorResponse),
        (status = 404, description = "Unknown entity or field", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path((entity, field)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let field = state.upload_field(&entity, &field)?;
    let multipart = multipart?;

    let response = state.upload_service().stage_field(&field, multipart).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors from the
//! storage, processing and commit layers convert into `HttpAppError` so every failure
//! renders with the same body shape and log level.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tourney_core::{AppError, ErrorMetadata, LogLevel};
use tourney_processing::ValidationError;
use tourney_storage::{CommitError, StorageError};
use utoipa::ToSchema;

use crate::constants::UPLOAD_COMMIT_FAILED_MESSAGE;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Field name to message, present on validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from tourney-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Non-multipart request bodies are a 400 in our format instead of axum's plain text.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid multipart request: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(multipart_error(err))
    }
}

pub(crate) fn multipart_error(err: MultipartError) -> AppError {
    AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Field messages are meant for the client and are kept in production
        let data = app_error.field_errors().map(|errors| errors.to_json());

        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
                data,
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
                data,
            })
        };

        (status, body).into_response()
    }
}

// Convert domain errors to AppError here, core cannot see the storage and processing crates

pub(crate) fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::UploadFailed(msg) => AppError::Internal(msg),
        StorageError::DeleteFailed(msg) => AppError::Internal(msg),
        StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
    }
}

/// A missing staged file is the client's problem (never uploaded, or reaped by the
/// sweep); everything else is reported as an opaque commit failure.
pub(crate) fn commit_error(err: CommitError) -> AppError {
    match err {
        CommitError::MissingStagedFile { entity, filename } => AppError::InvalidFileReference(
            format!("Staged file {}/{} does not exist", entity, filename),
        ),
        failed @ CommitError::Failed { .. } => AppError::UploadCommitFailed {
            message: UPLOAD_COMMIT_FAILED_MESSAGE.to_string(),
            source: anyhow::Error::new(failed),
        },
    }
}

/// Validation that could not run to completion. Field-level failures never get
/// here, they are recorded through `ValidationError::field_message`.
pub(crate) fn validation_io_error(err: ValidationError) -> AppError {
    AppError::Internal(format!("Failed to validate staged file: {}", err))
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error(err))
    }
}

impl From<CommitError> for HttpAppError {
    fn from(err: CommitError) -> Self {
        HttpAppError(commit_error(err))
    }
}

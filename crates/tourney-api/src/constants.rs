//! API constants

/// Prefix of the admin routes
pub const API_PREFIX: &str = "/api/admin";

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Success message of the upload endpoint
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Upload file successfully";

/// Message of the aggregated validation error
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// Client message when a commit fails for a reason other than a missing staged file
pub const UPLOAD_COMMIT_FAILED_MESSAGE: &str = "Error occurs when uploading image";

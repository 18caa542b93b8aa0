use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::UPLOAD_SUCCESS_MESSAGE;

/// Body of a successful upload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Field name to staged filename
    pub data: BTreeMap<String, String>,
}

impl UploadResponse {
    pub fn new(field: &str, filename: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(field.to_string(), filename.into());
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            data,
        }
    }
}

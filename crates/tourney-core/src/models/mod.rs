//! Data models for the upload pipeline

mod entity;
mod field_errors;
mod upload;

pub use entity::EntityName;
pub use field_errors::FieldErrors;
pub use upload::{
    extension_of, not_allowed_message, CommittedAsset, StagedFile, StagedFileState,
    UploadField, FILE_TOO_LARGE_MESSAGE,
};

//! Tourney Core Library
//!
//! Domain models, error types, configuration and shared constants for the
//! tournament admin upload pipeline. Every other tourney crate depends on this one.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CommittedAsset, EntityName, FieldErrors, StagedFile, StagedFileState, UploadField,
};

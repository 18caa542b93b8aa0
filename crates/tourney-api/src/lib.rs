//! Tourney API Library
//!
//! HTTP surface of the admin upload pipeline: the multipart upload handler,
//! the upload service used by create/update flows, and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;

pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{UploadResponse, UploadService};
pub use state::AppState;

//! Upload service
//!
//! Intake of multipart uploads into the staging area, validation of staged
//! file references sent back by clients, and the commit into permanent storage.

mod intake;
mod service;
mod types;

pub use service::UploadService;
pub use types::UploadResponse;

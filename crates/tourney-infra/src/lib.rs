//! Tourney Infrastructure Library
//!
//! Shared infrastructure for the tourney services:
//! - Telemetry initialization (tracing subscriber)
//! - The scheduled sweep of the upload staging area

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "cleanup")]
pub mod cleanup;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

#[cfg(feature = "cleanup")]
pub use cleanup::CleanupService;

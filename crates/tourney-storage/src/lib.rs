//! Tourney Storage Library
//!
//! Filesystem side of the upload pipeline: the staging area uploads land in,
//! the commit step that moves them into permanent storage, and the age-based
//! sweep that reaps staged files nobody committed.
//!
//! # Layout
//!
//! - staged files: `<tempRoot>/<entity>/<generatedFilename>`
//! - committed assets: `<permanentRoot>/<entity>/<filename>`
//!
//! Filenames must not contain path separators or `..`. Staged names are generated
//! in the `keys` module so concurrent uploads never collide.

pub mod commit;
pub mod error;
pub mod keys;
pub mod staging;
pub mod sweep;

// Re-export commonly used types
pub use commit::{CommitError, CommitStrategy, PermanentStore};
pub use error::{StorageError, StorageResult};
pub use staging::{StagedWrite, StagingArea};
pub use sweep::{sweep, sweep_at, sweep_with_report, SweepReport};

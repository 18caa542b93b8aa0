//! Filename generation and validation for both storage roots.
//!
//! Staged names are `{uuid-v4-simple}.{ext}`: 122 random bits, so two uploads
//! never share a name and a staged name never collides with a committed one.

use std::path::Path;

use tourney_core::models::extension_of;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Generate a unique staged filename keeping the original's lowercase extension.
pub fn generate_staged_filename(original: &str) -> String {
    let id = Uuid::new_v4().simple();
    match extension_of(original) {
        Some(ext) if is_safe_extension(&ext) => format!("{}.{}", id, ext),
        _ => id.to_string(),
    }
}

fn is_safe_extension(ext: &str) -> bool {
    ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Reject names that could escape the entity directory.
pub fn validate_filename(filename: &str) -> StorageResult<()> {
    if filename.is_empty()
        || filename == "."
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return Err(StorageError::InvalidKey(filename.to_string()));
    }

    // A single plain component, nothing else
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidKey(filename.to_string())),
    }
}

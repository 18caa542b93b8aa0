use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use super::EntityName;

/// Lifecycle of a file in the staging area.
///
/// `Created -> Validated -> Committed` or `Created -> Abandoned -> Reaped`.
/// A file that fails validation stays `Created` until the sweep reaps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StagedFileState {
    Created,
    Validated,
    Committed,
    Abandoned,
    Reaped,
}

impl StagedFileState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StagedFileState::Committed | StagedFileState::Reaped)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: StagedFileState) -> bool {
        matches!(
            (self, next),
            (StagedFileState::Created, StagedFileState::Validated)
                | (StagedFileState::Created, StagedFileState::Abandoned)
                | (StagedFileState::Validated, StagedFileState::Committed)
                | (StagedFileState::Validated, StagedFileState::Abandoned)
                | (StagedFileState::Abandoned, StagedFileState::Reaped)
        )
    }
}

/// A file sitting under `<tempRoot>/<entity>/`.
///
/// There is no record of a staged upload apart from the file itself, so this
/// is always built from filesystem metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub entity: EntityName,
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Lowercase extension without the dot
    pub extension: Option<String>,
    pub modified: Option<DateTime<Utc>>,
}

impl StagedFile {
    pub fn from_metadata(
        entity: EntityName,
        filename: impl Into<String>,
        path: impl Into<PathBuf>,
        metadata: &Metadata,
    ) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename);
        Self {
            entity,
            filename,
            path: path.into(),
            size_bytes: metadata.len(),
            extension,
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }
}

/// A file under `<permanentRoot>/<entity>/`, written once by the commit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedAsset {
    pub entity: EntityName,
    pub filename: String,
    pub path: PathBuf,
}

impl CommittedAsset {
    /// Path string persisted on the owning entity
    pub fn stored_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Lowercase extension of a filename, without the leading dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// An uploadable field on an entity, e.g. `teams.flagIcon`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadField {
    pub entity: EntityName,
    /// Multipart field name and request body key
    pub name: &'static str,
    /// Human label used in error messages
    pub label: &'static str,
    /// Width applied on commit; `None` keeps the original bytes
    pub resize_width: Option<u32>,
}

const UPLOAD_FIELDS: &[(EntityName, &str, &str)] = &[
    (EntityName::Teams, "flagIcon", "Flag Icon"),
    (EntityName::Users, "avatar", "Avatar"),
];

impl UploadField {
    /// Look up a registered field. Image fields resize to `resize_width`.
    pub fn find(entity: EntityName, name: &str, resize_width: Option<u32>) -> Option<Self> {
        UPLOAD_FIELDS
            .iter()
            .find(|(e, n, _)| *e == entity && *n == name)
            .map(|&(entity, name, label)| UploadField {
                entity,
                name,
                label,
                resize_width,
            })
    }

    /// Every registered field
    pub fn all(resize_width: Option<u32>) -> Vec<Self> {
        UPLOAD_FIELDS
            .iter()
            .map(|&(entity, name, label)| UploadField {
                entity,
                name,
                label,
                resize_width,
            })
            .collect()
    }

    pub fn required_message(&self) -> String {
        format!("{} is a required field", self.label)
    }

    pub fn empty_message(&self) -> String {
        format!("{} file is empty.", self.label)
    }

    pub fn invalid_path_message(&self) -> String {
        format!("Invalid {} file path", self.label)
    }

    pub fn duplicate_message(&self) -> String {
        format!("Only one {} file is allowed", self.label)
    }
}

pub const FILE_TOO_LARGE_MESSAGE: &str = "File too large";

pub fn not_allowed_message<S: AsRef<str>>(allowed: &[S]) -> String {
    let list: Vec<&str> = allowed.iter().map(|s| s.as_ref()).collect();
    format!(
        "File type not allowed. Please upload image with these types: {}",
        list.join(", ")
    )
}

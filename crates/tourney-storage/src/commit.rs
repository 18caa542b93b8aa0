//! Commit step: staged file -> permanent asset
//!
//! The caller picks one [`CommitStrategy`] up front; each strategy is a separate
//! branch below so the three outcomes can be exercised on their own.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::fs;
use tourney_core::{CommittedAsset, EntityName};
use tourney_processing::{ImageResizer, ResizeError};

use crate::error::{StorageError, StorageResult};
use crate::keys::validate_filename;
use crate::staging::StagingArea;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
    /// Resize into the permanent path, then delete the staged file
    ResizeAndDelete { width: u32 },
    /// Resize into the permanent path and leave the staged file for preview flows
    ResizeAndKeep { width: u32 },
    /// Rename the staged file into place
    MoveOnly,
    /// Byte copy, the staged file stays
    CopyPreserve,
}

impl CommitStrategy {
    /// A resize width always wins; otherwise move when the staged file may go, copy when it must stay.
    pub fn select(resize_width: Option<u32>, delete_staged: bool) -> Self {
        match (resize_width, delete_staged) {
            (Some(width), true) => CommitStrategy::ResizeAndDelete { width },
            (Some(width), false) => CommitStrategy::ResizeAndKeep { width },
            (None, true) => CommitStrategy::MoveOnly,
            (None, false) => CommitStrategy::CopyPreserve,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommitStrategy::ResizeAndDelete { .. } => "resize_and_delete",
            CommitStrategy::ResizeAndKeep { .. } => "resize_and_keep",
            CommitStrategy::MoveOnly => "move_only",
            CommitStrategy::CopyPreserve => "copy_preserve",
        }
    }

    /// Whether the staged file is gone after a successful commit
    pub fn consumes_staged(&self) -> bool {
        matches!(
            self,
            CommitStrategy::ResizeAndDelete { .. } | CommitStrategy::MoveOnly
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Never uploaded, already reaped by the sweep, or an unsafe name
    #[error("Staged file not found: {entity}/{filename}")]
    MissingStagedFile { entity: EntityName, filename: String },

    #[error("Failed to commit {path}")]
    Failed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl CommitError {
    fn failed(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        CommitError::Failed {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Permanent asset store, one sub-directory per entity.
#[derive(Debug, Clone)]
pub struct PermanentStore {
    root: PathBuf,
    staging: StagingArea,
}

impl PermanentStore {
    pub fn new(root: impl Into<PathBuf>, staging: StagingArea) -> Self {
        Self {
            root: root.into(),
            staging,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn entity_dir(&self, entity: EntityName) -> PathBuf {
        self.root.join(entity.as_str())
    }

    pub fn path_for(&self, entity: EntityName, filename: &str) -> StorageResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.entity_dir(entity).join(filename))
    }

    /// Create the permanent root if it does not exist yet
    pub async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Commit `<tempRoot>/<entity>/<filename>` to `<root>/<entity>/<filename>`.
    ///
    /// A missing staged file is reported as [`CommitError::MissingStagedFile`], which
    /// also covers the sweep deleting it between validation and commit. Any other
    /// failure is [`CommitError::Failed`]. A half-created target directory is left
    /// as is; the next commit to the same path reuses it.
    #[tracing::instrument(skip(self))]
    pub async fn commit(
        &self,
        entity: EntityName,
        filename: &str,
        strategy: CommitStrategy,
    ) -> Result<CommittedAsset, CommitError> {
        let missing = || CommitError::MissingStagedFile {
            entity,
            filename: filename.to_string(),
        };

        let staged = self.staging.path_for(entity, filename).map_err(|_| missing())?;
        let target = self.path_for(entity, filename).map_err(|_| missing())?;
        let start = Instant::now();
        tracing::debug!(strategy = strategy.name(), "Committing staged upload");

        match fs::metadata(&staged).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(missing()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(CommitError::failed(&staged, e)),
        }

        let target_dir = self.entity_dir(entity);
        fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| CommitError::failed(&target_dir, e))?;

        match strategy {
            CommitStrategy::ResizeAndDelete { width } => {
                resize_into(&staged, width, &target).await.map_err(|e| {
                    if is_not_found(&e) {
                        missing()
                    } else {
                        CommitError::failed(&target, e)
                    }
                })?;
                remove_staged(&staged).await?;
            }
            CommitStrategy::ResizeAndKeep { width } => {
                resize_into(&staged, width, &target).await.map_err(|e| {
                    if is_not_found(&e) {
                        missing()
                    } else {
                        CommitError::failed(&target, e)
                    }
                })?;
            }
            CommitStrategy::MoveOnly => {
                if let Err(e) = fs::rename(&staged, &target).await {
                    if e.kind() == io::ErrorKind::NotFound {
                        return Err(missing());
                    }
                    // Roots on different filesystems cannot be renamed across
                    tracing::debug!(error = %e, "Rename failed, falling back to copy");
                    copy_into(&staged, &target).await.map_err(|e| {
                        if e.kind() == io::ErrorKind::NotFound {
                            missing()
                        } else {
                            CommitError::failed(&target, e)
                        }
                    })?;
                    remove_staged(&staged).await?;
                }
            }
            CommitStrategy::CopyPreserve => {
                copy_into(&staged, &target).await.map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        missing()
                    } else {
                        CommitError::failed(&target, e)
                    }
                })?;
            }
        }

        tracing::info!(
            entity = %entity,
            filename = %filename,
            path = %target.display(),
            strategy = strategy.name(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Staged upload committed"
        );

        Ok(CommittedAsset {
            entity,
            filename: filename.to_string(),
            path: target,
        })
    }

    /// Delete a committed asset. Returns false when it did not exist.
    pub async fn remove(&self, entity: EntityName, filename: &str) -> StorageResult<bool> {
        let path = self.path_for(entity, filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(entity = %entity, path = %path.display(), "Committed asset removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

async fn resize_into(staged: &Path, width: u32, target: &Path) -> Result<(), ResizeError> {
    ImageResizer::resize(staged, width, Some(target)).await?;
    Ok(())
}

async fn copy_into(staged: &Path, target: &Path) -> io::Result<()> {
    fs::copy(staged, target).await?;
    Ok(())
}

/// Remove the staged file after its content reached the permanent path.
/// Already gone (reaped concurrently) is fine.
async fn remove_staged(staged: &Path) -> Result<(), CommitError> {
    match fs::remove_file(staged).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CommitError::failed(staged, e)),
    }
}

fn is_not_found(err: &ResizeError) -> bool {
    matches!(err, ResizeError::Io(e) if e.kind() == io::ErrorKind::NotFound)
}

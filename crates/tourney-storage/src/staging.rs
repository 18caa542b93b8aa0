use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tourney_core::{EntityName, StagedFile};

use crate::error::{StorageError, StorageResult};
use crate::keys::{generate_staged_filename, validate_filename};

/// Result of streaming one upload into the staging area.
#[derive(Debug, Clone)]
pub struct StagedWrite {
    pub file: StagedFile,
    /// More than the limit arrived; only the first `max_bytes` were written
    pub exceeded_limit: bool,
}

/// Temporary upload area, one sub-directory per entity.
///
/// Files here have no record besides the file itself. They are either committed
/// into the permanent store or reaped by the sweep.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the staging root if it does not exist yet
    pub async fn ensure_root(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create staging directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    pub fn entity_dir(&self, entity: EntityName) -> PathBuf {
        self.root.join(entity.as_str())
    }

    /// Path of a staged file, rejecting names that would leave the entity directory
    pub fn path_for(&self, entity: EntityName, filename: &str) -> StorageResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.entity_dir(entity).join(filename))
    }

    /// Stream an upload to `<root>/<entity>/<generated name>`.
    ///
    /// Writing stops once more than `max_bytes` arrived. The partial file stays on
    /// disk for the sweep, same as any other file that fails validation.
    pub async fn stage_stream<S, E>(
        &self,
        entity: EntityName,
        original_filename: &str,
        mut stream: S,
        max_bytes: u64,
    ) -> StorageResult<StagedWrite>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let filename = generate_staged_filename(original_filename);
        let dir = self.entity_dir(entity);
        let path = dir.join(&filename);
        let start = Instant::now();

        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut written: u64 = 0;
        let mut exceeded_limit = false;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to read upload for {}: {}",
                    path.display(),
                    e
                ))
            })?;

            let remaining = max_bytes.saturating_sub(written);
            if chunk.len() as u64 > remaining {
                file.write_all(&chunk[..remaining as usize]).await?;
                written += remaining;
                exceeded_limit = true;
                break;
            }

            file.write_all(&chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;
        drop(file);

        let metadata = fs::metadata(&path).await?;
        let staged = StagedFile::from_metadata(entity, filename, &path, &metadata);

        tracing::info!(
            entity = %entity,
            filename = %staged.filename,
            original = %original_filename,
            path = %path.display(),
            size_bytes = written,
            exceeded_limit = exceeded_limit,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Staged upload written"
        );

        Ok(StagedWrite {
            file: staged,
            exceeded_limit,
        })
    }

    /// Stage an in-memory upload
    pub async fn stage_bytes(
        &self,
        entity: EntityName,
        original_filename: &str,
        data: Bytes,
        max_bytes: u64,
    ) -> StorageResult<StagedWrite> {
        let stream = futures::stream::iter([Ok::<Bytes, std::io::Error>(data)]);
        self.stage_stream(entity, original_filename, stream, max_bytes)
            .await
    }

    /// Look up a staged file by name.
    pub async fn inspect(&self, entity: EntityName, filename: &str) -> StorageResult<StagedFile> {
        let path = self.path_for(entity, filename)?;
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(StagedFile::from_metadata(
                entity, filename, path, &metadata,
            )),
            Ok(_) => Err(StorageError::NotFound(filename.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}

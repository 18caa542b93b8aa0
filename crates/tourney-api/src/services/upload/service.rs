use axum::extract::Multipart;
use tourney_core::{AppError, CommittedAsset, FieldErrors, StagedFile, UploadField};
use tourney_storage::{CommitError, CommitStrategy, StorageError};

use super::intake::read_upload;
use super::types::UploadResponse;
use crate::constants::VALIDATION_FAILED_MESSAGE;
use crate::error::{commit_error, storage_error, validation_io_error};
use crate::state::AppState;

/// Upload pipeline operations for one request.
///
/// Staging and commit are separate calls: an upload only stages the file and
/// hands its name back, a later create/update validates that name and commits it.
pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Stage the multipart file of `field`.
    ///
    /// All field errors are aggregated into one `AppError::Validation`.
    #[tracing::instrument(skip_all, fields(entity = %field.entity, field = field.name))]
    pub async fn stage_field(
        &self,
        field: &UploadField,
        multipart: Multipart,
    ) -> Result<UploadResponse, AppError> {
        let outcome = read_upload(self.state, field, multipart).await?;
        outcome.errors.into_result(VALIDATION_FAILED_MESSAGE)?;

        let staged = outcome.staged.ok_or_else(|| {
            AppError::Internal("Upload accepted without a staged file".to_string())
        })?;

        tracing::info!(
            filename = %staged.filename,
            size_bytes = staged.size_bytes,
            "Upload staged"
        );

        Ok(UploadResponse::new(field.name, staged.filename))
    }

    /// Check a staged filename sent back by a client before it is committed.
    ///
    /// Problems with the reference are recorded on `errors` under the field's
    /// name and give `Ok(None)`. System faults while looking at the staged file
    /// are returned as errors.
    pub async fn validate_reference(
        &self,
        field: &UploadField,
        filename: Option<&str>,
        errors: &mut FieldErrors,
    ) -> Result<Option<StagedFile>, AppError> {
        let Some(filename) = filename.filter(|f| !f.trim().is_empty()) else {
            errors.add(field.name, field.required_message());
            return Ok(None);
        };

        let staged = match self.state.staging.inspect(field.entity, filename).await {
            Ok(staged) => staged,
            Err(StorageError::NotFound(_)) | Err(StorageError::InvalidKey(_)) => {
                errors.add(field.name, field.invalid_path_message());
                return Ok(None);
            }
            Err(e) => return Err(storage_error(e)),
        };

        if let Err(e) = self.state.validator.validate_file(&staged.path).await {
            match e.field_message(field) {
                Some(message) => {
                    errors.add(field.name, message);
                }
                None => return Err(validation_io_error(e)),
            }
            return Ok(None);
        }

        Ok(Some(staged))
    }

    /// Commit a validated staged file into permanent storage.
    ///
    /// The field's resize width selects the strategy; `delete_staged` decides
    /// whether the staged file may be consumed.
    pub async fn commit_field(
        &self,
        field: &UploadField,
        filename: &str,
        delete_staged: bool,
    ) -> Result<CommittedAsset, AppError> {
        let strategy = CommitStrategy::select(field.resize_width, delete_staged);
        self.state
            .store
            .commit(field.entity, filename, strategy)
            .await
            .map_err(|e| {
                if let CommitError::Failed { path, source } = &e {
                    tracing::error!(
                        entity = %field.entity,
                        filename = %filename,
                        path = %path.display(),
                        strategy = strategy.name(),
                        error = %source,
                        "Commit failed"
                    );
                }
                commit_error(e)
            })
    }

    /// Commit a new file for a field that already has an asset, then drop the old one.
    ///
    /// The old asset is only removed once the new one is in place; an old
    /// file that is already gone is not an error.
    pub async fn replace_asset(
        &self,
        field: &UploadField,
        filename: &str,
        previous: Option<&str>,
    ) -> Result<CommittedAsset, AppError> {
        let asset = self.commit_field(field, filename, true).await?;

        if let Some(previous) = previous.filter(|p| *p != filename) {
            let removed = self
                .state
                .store
                .remove(field.entity, previous)
                .await
                .map_err(storage_error)?;
            if !removed {
                tracing::debug!(previous = %previous, "Previous asset already gone");
            }
        }

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use tourney_core::{Config, EntityName, ErrorMetadata};
    use tourney_storage::{PermanentStore, StagingArea};

    struct Fixture {
        _dir: TempDir,
        state: AppState,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            upload_temp_file_dir: dir.path().join("tmp"),
            upload_file_dir: dir.path().join("files"),
            ..Config::default()
        };
        let staging = StagingArea::new(&config.upload_temp_file_dir);
        let store = PermanentStore::new(&config.upload_file_dir, staging.clone());
        Fixture {
            _dir: dir,
            state: AppState::new(config, staging, store),
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn stage(state: &AppState, name: &str, data: Vec<u8>) -> String {
        state
            .staging
            .stage_bytes(EntityName::Teams, name, data.into(), state.config.max_file_size_bytes)
            .await
            .unwrap()
            .file
            .filename
    }

    fn flag_icon(state: &AppState) -> UploadField {
        state.upload_field("teams", "flagIcon").unwrap()
    }

    #[tokio::test]
    async fn test_validate_reference_missing_value() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);
        let mut errors = FieldErrors::new();

        assert!(service
            .validate_reference(&field, None, &mut errors)
            .await
            .unwrap()
            .is_none());
        assert_eq!(errors.get("flagIcon"), Some("Flag Icon is a required field"));
    }

    #[tokio::test]
    async fn test_validate_reference_unknown_or_unsafe_name() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);

        let mut errors = FieldErrors::new();
        assert!(service
            .validate_reference(&field, Some("nope.png"), &mut errors)
            .await
            .unwrap()
            .is_none());
        assert_eq!(errors.get("flagIcon"), Some("Invalid Flag Icon file path"));

        let mut errors = FieldErrors::new();
        assert!(service
            .validate_reference(&field, Some("../files/teams/x.png"), &mut errors)
            .await
            .unwrap()
            .is_none());
        assert_eq!(errors.get("flagIcon"), Some("Invalid Flag Icon file path"));
    }

    #[tokio::test]
    async fn test_validate_reference_empty_and_text_files() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);

        let empty = stage(&f.state, "empty.png", Vec::new()).await;
        let mut errors = FieldErrors::new();
        assert!(service
            .validate_reference(&field, Some(&empty), &mut errors)
            .await
            .unwrap()
            .is_none());
        assert_eq!(errors.get("flagIcon"), Some("Flag Icon file is empty."));

        let text = stage(&f.state, "notes.jpg", b"just some text".to_vec()).await;
        let mut errors = FieldErrors::new();
        assert!(service
            .validate_reference(&field, Some(&text), &mut errors)
            .await
            .unwrap()
            .is_none());
        assert!(errors
            .get("flagIcon")
            .unwrap()
            .starts_with("File type not allowed."));
    }

    #[tokio::test]
    async fn test_validate_then_commit_resizes_and_consumes_staged() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);
        let name = stage(&f.state, "england.png", png(600, 400)).await;

        let mut errors = FieldErrors::new();
        let staged = service
            .validate_reference(&field, Some(&name), &mut errors)
            .await
            .unwrap()
            .unwrap();
        assert!(errors.is_empty());

        let asset = service.commit_field(&field, &name, true).await.unwrap();
        assert!(!staged.path.exists());

        let committed = image::open(&asset.path).unwrap();
        assert_eq!(committed.width(), 300);
        assert_eq!(committed.height(), 200);
    }

    #[tokio::test]
    async fn test_validate_reference_system_fault_is_not_a_field_error() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);

        // Entity staging dir replaced by a regular file
        std::fs::create_dir_all(&f.state.config.upload_temp_file_dir).unwrap();
        std::fs::write(f.state.config.upload_temp_file_dir.join("teams"), b"x").unwrap();

        let mut errors = FieldErrors::new();
        let err = service
            .validate_reference(&field, Some("abc.png"), &mut errors)
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 500);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_commit_missing_staged_file_is_invalid_reference() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);

        let err = service.commit_field(&field, "gone.png", true).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFileReference(_)));
    }

    #[tokio::test]
    async fn test_replace_asset_removes_previous() {
        let f = fixture();
        let service = f.state.upload_service();
        let field = flag_icon(&f.state);

        let first = stage(&f.state, "a.png", png(40, 40)).await;
        let old = service.commit_field(&field, &first, true).await.unwrap();

        let second = stage(&f.state, "b.png", png(40, 40)).await;
        let new = service
            .replace_asset(&field, &second, Some(&first))
            .await
            .unwrap();

        assert!(!old.path.exists());
        assert!(new.path.exists());

        // Previous asset already deleted elsewhere
        let third = stage(&f.state, "c.png", png(40, 40)).await;
        assert!(service
            .replace_asset(&field, &third, Some(&first))
            .await
            .is_ok());
    }
}

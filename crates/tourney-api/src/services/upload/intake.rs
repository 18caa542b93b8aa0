use axum::extract::Multipart;
use tourney_core::models::FILE_TOO_LARGE_MESSAGE;
use tourney_core::{AppError, FieldErrors, StagedFile, UploadField};

use crate::error::{multipart_error, storage_error, validation_io_error};
use crate::state::AppState;

/// What one multipart request left behind for the expected field.
#[derive(Debug, Default)]
pub(super) struct IntakeOutcome {
    /// Set only when the file passed every check
    pub staged: Option<StagedFile>,
    pub errors: FieldErrors,
}

/// Read every part of `multipart`, staging the file part named after `field`.
///
/// Checks run in order and stop at the first failure for the field:
/// extension (nothing written), size limit (partial file kept), empty file,
/// sniffed content. Files written before a failure stay for the sweep.
/// I/O failures abort the whole request instead of becoming field errors.
pub(super) async fn read_upload(
    state: &AppState,
    field: &UploadField,
    mut multipart: Multipart,
) -> Result<IntakeOutcome, AppError> {
    let mut outcome = IntakeOutcome::default();
    let mut seen = false;

    while let Some(part) = multipart.next_field().await.map_err(multipart_error)? {
        if part.name() != Some(field.name) {
            continue;
        }
        // Plain text parts under the file field's name are not files
        let Some(original) = part.file_name().map(str::to_string) else {
            continue;
        };

        if seen {
            outcome.errors.add(field.name, field.duplicate_message());
            continue;
        }
        seen = true;

        if let Err(e) = state.validator.validate_extension(&original) {
            tracing::debug!(original = %original, error = %e, "Upload rejected by extension");
            if let Some(message) = e.field_message(field) {
                outcome.errors.add(field.name, message);
            }
            continue;
        }

        let write = state
            .staging
            .stage_stream(
                field.entity,
                &original,
                part,
                state.validator.max_file_size(),
            )
            .await
            .map_err(storage_error)?;

        if write.exceeded_limit {
            tracing::debug!(
                filename = %write.file.filename,
                max_bytes = state.validator.max_file_size(),
                "Upload exceeded size limit"
            );
            outcome.errors.add(field.name, FILE_TOO_LARGE_MESSAGE);
            continue;
        }

        match state.validator.validate_file(&write.file.path).await {
            Ok(sniffed) => {
                tracing::debug!(
                    filename = %write.file.filename,
                    detected = %sniffed,
                    "Upload content accepted"
                );
                outcome.staged = Some(write.file);
            }
            Err(e) => match e.field_message(field) {
                Some(message) => {
                    tracing::debug!(filename = %write.file.filename, error = %e, "Upload content rejected");
                    outcome.errors.add(field.name, message);
                }
                None => return Err(validation_io_error(e)),
            },
        }
    }

    if !seen {
        outcome.errors.add(field.name, field.required_message());
    }

    Ok(outcome)
}

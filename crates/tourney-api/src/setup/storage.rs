//! Storage initialization

use anyhow::{Context, Result};
use tourney_core::Config;
use tourney_storage::{PermanentStore, StagingArea};

/// Create both upload roots and the stores over them
pub async fn setup_storage(config: &Config) -> Result<(StagingArea, PermanentStore)> {
    let staging = StagingArea::new(&config.upload_temp_file_dir);
    staging
        .ensure_root()
        .await
        .context("Failed to initialize staging area")?;

    let store = PermanentStore::new(&config.upload_file_dir, staging.clone());
    store
        .ensure_root()
        .await
        .context("Failed to initialize permanent storage")?;

    tracing::info!(
        staging = %config.upload_temp_file_dir.display(),
        storage = %config.upload_file_dir.display(),
        "Local upload storage initialized"
    );

    Ok((staging, store))
}

//! Application state shared by the handlers.

use tourney_core::{AppError, Config, EntityName, UploadField};
use tourney_processing::{AcceptPolicy, UploadValidator};
use tourney_storage::{PermanentStore, StagingArea};

use crate::services::upload::UploadService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub validator: UploadValidator,
    pub staging: StagingArea,
    pub store: PermanentStore,
}

impl AppState {
    pub fn new(config: Config, staging: StagingArea, store: PermanentStore) -> Self {
        let validator = UploadValidator::new(
            config.max_file_size_bytes,
            AcceptPolicy::from_extensions(&config.accept_image_extensions),
        );

        Self {
            config,
            validator,
            staging,
            store,
        }
    }

    pub fn upload_service(&self) -> UploadService<'_> {
        UploadService::new(self)
    }

    /// Resolve the `{entity}/{field}` pair of an upload route.
    pub fn upload_field(&self, entity: &str, field: &str) -> Result<UploadField, AppError> {
        let entity: EntityName = entity
            .parse()
            .map_err(|_| AppError::NotFound(format!("Unknown entity: {}", entity)))?;

        UploadField::find(entity, field, Some(self.config.default_image_width)).ok_or_else(|| {
            AppError::NotFound(format!("Entity {} has no upload field {}", entity, field))
        })
    }
}

use std::path::Path;

use tourney_core::models::{
    extension_of, not_allowed_message, UploadField, FILE_TOO_LARGE_MESSAGE,
};

use crate::policy::AcceptPolicy;
use crate::sniffer::{sniff, SniffedType};

/// Validation errors for a single uploaded file
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Unsupported file content: {detected} (allowed: {allowed:?})")]
    UnsupportedContent {
        detected: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ValidationError {
    /// Message recorded against `field` in the request's error map.
    ///
    /// `None` for I/O failures: those are system faults and never become field errors.
    pub fn field_message(&self, field: &UploadField) -> Option<String> {
        match self {
            ValidationError::FileTooLarge { .. } => Some(FILE_TOO_LARGE_MESSAGE.to_string()),
            ValidationError::InvalidExtension { allowed, .. }
            | ValidationError::UnsupportedContent { allowed, .. } => {
                Some(not_allowed_message(allowed))
            }
            ValidationError::EmptyFile => Some(field.empty_message()),
            ValidationError::Io(_) => None,
        }
    }
}

/// Upload file validator
///
/// Size limit plus the accepted type policy. The content check always wins over
/// the declared extension: a `.jpg` holding text fails `validate_sniffed`.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    policy: AcceptPolicy,
}

impl UploadValidator {
    pub fn new(max_file_size: u64, policy: AcceptPolicy) -> Self {
        Self {
            max_file_size,
            policy,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn policy(&self) -> &AcceptPolicy {
        &self.policy
    }

    /// Validate the client supplied file name's extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = extension_of(filename).unwrap_or_default();
        if !self.policy.is_accepted(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.policy.describe(),
            });
        }
        Ok(())
    }

    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate_not_empty(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        Ok(())
    }

    pub fn validate_sniffed(&self, sniffed: &SniffedType) -> Result<(), ValidationError> {
        if !self.policy.accepts_sniffed(sniffed) {
            return Err(ValidationError::UnsupportedContent {
                detected: sniffed.to_string(),
                allowed: self.policy.describe(),
            });
        }
        Ok(())
    }

    /// Validate a file already on disk: size limit, then emptiness, then content.
    pub async fn validate_file(&self, path: &Path) -> Result<SniffedType, ValidationError> {
        let size = tokio::fs::metadata(path).await?.len();
        self.validate_size(size)?;
        self.validate_not_empty(size)?;
        let sniffed = sniff(path).await?;
        self.validate_sniffed(&sniffed)?;
        Ok(sniffed)
    }
}

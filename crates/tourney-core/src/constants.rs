//! Default values shared by configuration, intake and the cleanup sweep.

/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 3001;

/// Default staging root for uploads that are not yet attached to an entity
pub const DEFAULT_UPLOAD_TEMP_FILE_DIR: &str = "uploads/tmp";

/// Default root for committed assets
pub const DEFAULT_UPLOAD_FILE_DIR: &str = "uploads/files";

/// Per-field upload limit (5 MiB)
pub const DEFAULT_IMAGE_SIZE_LIMIT: u64 = 5 * 1024 * 1024;

/// Width image fields are resized to on commit
pub const DEFAULT_IMAGE_WIDTH: u32 = 300;

/// Accepted image extensions, lower case, without the leading dot
pub const ACCEPT_IMAGE_EXTENSION: &[&str] = &["jpg", "jpeg", "png", "gif", "tiff"];

/// Staged files older than this are reaped by the sweep (24 hours)
pub const DEFAULT_OLD_TEMP_FILE_MAX_AGE_MS: u64 = 24 * 60 * 60 * 1000;

/// Names the sweep never deletes
pub const DEFAULT_OLD_TEMP_FILE_IGNORE_LIST: &[&str] = &[".gitignore"];

/// Sweep cadence (once a day)
pub const DEFAULT_OLD_TEMP_FILE_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Bytes read from the head of a file when sniffing its type
pub const SNIFF_PREFIX_BYTES: usize = 8 * 1024;

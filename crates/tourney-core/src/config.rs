//! Configuration module
//!
//! Settings for the HTTP server, the staging and permanent upload roots, the
//! accepted image policy and the temp-file sweep. Everything is read from the
//! environment (a `.env` file is loaded first when present).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    ACCEPT_IMAGE_EXTENSION, DEFAULT_IMAGE_SIZE_LIMIT, DEFAULT_IMAGE_WIDTH,
    DEFAULT_OLD_TEMP_FILE_IGNORE_LIST, DEFAULT_OLD_TEMP_FILE_MAX_AGE_MS,
    DEFAULT_OLD_TEMP_FILE_SWEEP_INTERVAL_SECS, DEFAULT_SERVER_PORT, DEFAULT_UPLOAD_FILE_DIR,
    DEFAULT_UPLOAD_TEMP_FILE_DIR,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Staging root, one sub-directory per entity
    pub upload_temp_file_dir: PathBuf,
    /// Permanent root, one sub-directory per entity
    pub upload_file_dir: PathBuf,
    pub max_file_size_bytes: u64,
    /// Lowercase extensions without the dot
    pub accept_image_extensions: Vec<String>,
    pub default_image_width: u32,
    pub old_temp_file_max_age_ms: u64,
    pub old_temp_file_ignore_list: Vec<String>,
    /// `0` disables the scheduled sweep
    pub old_temp_file_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            environment: "development".to_string(),
            upload_temp_file_dir: PathBuf::from(DEFAULT_UPLOAD_TEMP_FILE_DIR),
            upload_file_dir: PathBuf::from(DEFAULT_UPLOAD_FILE_DIR),
            max_file_size_bytes: DEFAULT_IMAGE_SIZE_LIMIT,
            accept_image_extensions: ACCEPT_IMAGE_EXTENSION
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_image_width: DEFAULT_IMAGE_WIDTH,
            old_temp_file_max_age_ms: DEFAULT_OLD_TEMP_FILE_MAX_AGE_MS,
            old_temp_file_ignore_list: DEFAULT_OLD_TEMP_FILE_IGNORE_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            old_temp_file_sweep_interval_secs: DEFAULT_OLD_TEMP_FILE_SWEEP_INTERVAL_SECS,
        }
    }
}

/// Split a comma separated extension list into lowercase entries without leading dots.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let accept_image_extensions = env::var("ACCEPT_IMAGE_EXTENSION")
            .map(|raw| parse_extension_list(&raw))
            .unwrap_or(defaults.accept_image_extensions);

        // Ignore-list entries are literal filenames, so case and leading dots are kept
        let old_temp_file_ignore_list = env::var("OLD_TEMP_FILE_IGNORE_LIST")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.old_temp_file_ignore_list);

        let config = Config {
            server_port,
            environment,
            upload_temp_file_dir: env::var("UPLOAD_TEMP_FILE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_temp_file_dir),
            upload_file_dir: env::var("UPLOAD_FILE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_file_dir),
            max_file_size_bytes: env::var("MAX_FILE_SIZE_BYTES")
                .unwrap_or_else(|_| DEFAULT_IMAGE_SIZE_LIMIT.to_string())
                .parse()
                .unwrap_or(DEFAULT_IMAGE_SIZE_LIMIT),
            accept_image_extensions,
            default_image_width: env::var("DEFAULT_IMAGE_WIDTH")
                .unwrap_or_else(|_| DEFAULT_IMAGE_WIDTH.to_string())
                .parse()
                .unwrap_or(DEFAULT_IMAGE_WIDTH),
            old_temp_file_max_age_ms: env::var("OLD_TEMP_FILE_MAX_AGE_MS")
                .unwrap_or_else(|_| DEFAULT_OLD_TEMP_FILE_MAX_AGE_MS.to_string())
                .parse()
                .unwrap_or(DEFAULT_OLD_TEMP_FILE_MAX_AGE_MS),
            old_temp_file_ignore_list,
            old_temp_file_sweep_interval_secs: env::var("OLD_TEMP_FILE_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_OLD_TEMP_FILE_SWEEP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_OLD_TEMP_FILE_SWEEP_INTERVAL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_BYTES must be greater than zero"
            ));
        }

        if self.accept_image_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ACCEPT_IMAGE_EXTENSION must list at least one extension"
            ));
        }

        if self.default_image_width == 0 {
            return Err(anyhow::anyhow!(
                "DEFAULT_IMAGE_WIDTH must be greater than zero"
            ));
        }

        // The sweep deletes anything old under the temp root, committed assets must live elsewhere
        if roots_overlap(&self.upload_temp_file_dir, &self.upload_file_dir) {
            return Err(anyhow::anyhow!(
                "UPLOAD_TEMP_FILE_DIR ({}) and UPLOAD_FILE_DIR ({}) must not overlap",
                self.upload_temp_file_dir.display(),
                self.upload_file_dir.display()
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn old_temp_file_max_age(&self) -> Duration {
        Duration::from_millis(self.old_temp_file_max_age_ms)
    }

    /// `None` when the scheduled sweep is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.old_temp_file_sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn roots_overlap(a: &Path, b: &Path) -> bool {
    a == b || a.starts_with(b) || b.starts_with(a)
}

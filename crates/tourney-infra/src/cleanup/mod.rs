//! Scheduled sweep of the upload staging area
//!
//! Staged uploads that never got committed are reaped once they are older than
//! the configured retention. The sweep itself is stateless; this service only
//! owns its parameters and the schedule.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tourney_core::Config;
use tourney_storage::{sweep_with_report, SweepReport};

#[derive(Debug, Clone)]
pub struct CleanupService {
    root: PathBuf,
    max_age: Duration,
    ignore_names: Vec<String>,
    every: Duration,
}

impl CleanupService {
    pub fn new(
        root: impl Into<PathBuf>,
        max_age: Duration,
        ignore_names: Vec<String>,
        every: Duration,
    ) -> Self {
        Self {
            root: root.into(),
            max_age,
            ignore_names,
            every,
        }
    }

    /// `None` when the scheduled sweep is disabled (`OLD_TEMP_FILE_SWEEP_INTERVAL_SECS=0`)
    pub fn from_config(config: &Config) -> Option<Self> {
        config.sweep_interval().map(|every| {
            Self::new(
                config.upload_temp_file_dir.clone(),
                config.old_temp_file_max_age(),
                config.old_temp_file_ignore_list.clone(),
                every,
            )
        })
    }

    /// Start the background sweep; the first run happens immediately.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.every.max(Duration::from_secs(1)));

            loop {
                sweep_interval.tick().await;

                tracing::info!(
                    root = %self.root.display(),
                    "Starting scheduled sweep of old temp files"
                );
                self.run_once().await;
            }
        })
    }

    /// Run a single sweep with the configured parameters
    #[tracing::instrument(skip(self), fields(cleanup.operation = "sweep_temp_files"))]
    pub async fn run_once(&self) -> SweepReport {
        let report = sweep_with_report(self.max_age, &self.ignore_names, &self.root).await;

        if report.failed > 0 {
            tracing::warn!(
                deleted = report.deleted,
                failed = report.failed,
                "Temp file sweep completed with failures"
            );
        } else {
            tracing::info!(deleted = report.deleted, "Temp file sweep completed");
        }

        report
    }
}

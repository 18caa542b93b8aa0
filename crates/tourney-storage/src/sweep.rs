//! Age-based sweep of the staging area
//!
//! Walks the tree under a root, deleting files whose modification time is older
//! than `now - max_age`. Entries named in the ignore list are skipped before
//! anything else (so an ignored directory is not descended into). Each directory
//! level is processed concurrently and fully joined before returning.
//!
//! The sweep never fails: unreadable directories and per-file errors are logged
//! and counted in the [`SweepReport`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::fs;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn did_delete(&self) -> bool {
        self.deleted > 0
    }

    fn merge(self, other: SweepReport) -> SweepReport {
        SweepReport {
            deleted: self.deleted + other.deleted,
            failed: self.failed + other.failed,
        }
    }

    fn one_deleted() -> Self {
        SweepReport {
            deleted: 1,
            failed: 0,
        }
    }

    fn one_failed() -> Self {
        SweepReport {
            deleted: 0,
            failed: 1,
        }
    }
}

/// Delete staged files older than `max_age` under `root`. Returns whether anything was deleted.
pub async fn sweep(max_age: Duration, ignore_names: &[String], root: &Path) -> bool {
    sweep_with_report(max_age, ignore_names, root)
        .await
        .did_delete()
}

pub async fn sweep_with_report(
    max_age: Duration,
    ignore_names: &[String],
    root: &Path,
) -> SweepReport {
    sweep_at(SystemTime::now(), max_age, ignore_names, root).await
}

/// Sweep with an explicit notion of "now". Files with `mtime < now - max_age` are deleted.
pub async fn sweep_at(
    now: SystemTime,
    max_age: Duration,
    ignore_names: &[String],
    root: &Path,
) -> SweepReport {
    let start = Instant::now();
    let cutoff = now.checked_sub(max_age).unwrap_or(UNIX_EPOCH);

    let report = sweep_dir(root.to_path_buf(), cutoff, ignore_names).await;

    tracing::info!(
        root = %root.display(),
        max_age_ms = max_age.as_millis() as u64,
        deleted = report.deleted,
        failed = report.failed,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Temp file sweep finished"
    );

    report
}

fn sweep_dir(dir: PathBuf, cutoff: SystemTime, ignore_names: &[String]) -> BoxFuture<'_, SweepReport> {
    async move {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory");
                return SweepReport::one_failed();
            }
        };

        let mut children = Vec::new();
        let mut report = SweepReport::default();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let ignored = entry
                        .file_name()
                        .to_str()
                        .map(|name| ignore_names.iter().any(|ignored| ignored == name))
                        .unwrap_or(false);
                    if !ignored {
                        children.push(entry.path());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Failed to list directory");
                    report = report.merge(SweepReport::one_failed());
                    break;
                }
            }
        }

        join_all(
            children
                .into_iter()
                .map(|path| sweep_entry(path, cutoff, ignore_names)),
        )
        .await
        .into_iter()
        .fold(report, SweepReport::merge)
    }
    .boxed()
}

async fn sweep_entry(path: PathBuf, cutoff: SystemTime, ignore_names: &[String]) -> SweepReport {
    let metadata = match fs::symlink_metadata(&path).await {
        Ok(metadata) => metadata,
        // Deleted by someone else (e.g. a commit) since the listing
        Err(e) if e.kind() == io::ErrorKind::NotFound => return SweepReport::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to stat temp file");
            return SweepReport::one_failed();
        }
    };

    if metadata.is_dir() {
        return sweep_dir(path, cutoff, ignore_names).await;
    }

    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Missing modification time");
            return SweepReport::one_failed();
        }
    };

    if modified >= cutoff {
        return SweepReport::default();
    }

    match fs::remove_file(&path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Deleted old temp file");
            SweepReport::one_deleted()
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => SweepReport::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete old temp file");
            SweepReport::one_failed()
        }
    }
}

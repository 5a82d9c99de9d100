//! Archive of previously generated flat files
//!
//! Every run drops a timestamped copy of its output into the archive
//! directory and then prunes the directory down to the newest reports.

use crate::config::Config;
use crate::constants::{ARCHIVE_FILE_PREFIX, ARCHIVE_TIMESTAMP_FORMAT};
use crate::{Error, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Timestamped report archive with simple count-based retention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArchive {
    dir: PathBuf,
    keep: usize,
}

impl ReportArchive {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Archive settings from the run configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.archive_dir(), config.archive.keep)
    }

    /// Archiving is off when nothing would be kept
    pub fn is_enabled(&self) -> bool {
        self.keep > 0
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for a report generated at `timestamp`
    pub fn report_name(timestamp: &DateTime<Local>) -> String {
        format!(
            "{}{}.txt",
            ARCHIVE_FILE_PREFIX,
            timestamp.format(ARCHIVE_TIMESTAMP_FORMAT)
        )
    }

    /// Copy `report` into the archive and prune old copies
    ///
    /// Returns the archived path, or `None` when archiving is disabled.
    pub fn store(&self, report: &Path, timestamp: &DateTime<Local>) -> Result<Option<PathBuf>> {
        if !self.is_enabled() {
            debug!("Report archive disabled");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::io(
                format!("cannot create archive directory {}", self.dir.display()),
                e,
            )
        })?;

        let target = self.dir.join(Self::report_name(timestamp));
        std::fs::copy(report, &target).map_err(|e| {
            Error::io(
                format!(
                    "cannot copy {} to {}",
                    report.display(),
                    target.display()
                ),
                e,
            )
        })?;
        info!("Archived report to {}", target.display());

        let removed = self.prune()?;
        if !removed.is_empty() {
            debug!("Pruned {} old reports", removed.len());
        }

        Ok(Some(target))
    }

    /// Reports in the archive, newest first
    pub fn reports(&self) -> Result<Vec<PathBuf>> {
        let pattern = format!(
            "{}/{}*.txt",
            glob::Pattern::escape(&self.dir.to_string_lossy()),
            ARCHIVE_FILE_PREFIX
        );
        let paths = glob::glob(&pattern).map_err(|e| {
            Error::configuration(format!("invalid archive directory pattern: {}", e))
        })?;

        let mut reports: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable archive entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let modified = path
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            reports.push((modified, path));
        }

        // Newest first; archive names embed the timestamp, so the name breaks ties
        reports.sort_by(|a, b| b.cmp(a));
        Ok(reports.into_iter().map(|(_, path)| path).collect())
    }

    /// Delete all but the newest `keep` reports
    ///
    /// Failures to delete a single report are logged and skipped.
    pub fn prune(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.reports()?.into_iter().skip(self.keep) {
            match std::fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(e) => warn!("Could not remove old report {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }
}

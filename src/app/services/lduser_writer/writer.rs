//! Atomic LDUSER file writer
//!
//! Records are streamed into a temporary file next to the destination. The
//! destination is only replaced by [`LduserWriter::finish`], so an aborted
//! run leaves the previous output untouched.

use super::format::render_record;
use crate::app::models::UserRecord;
use crate::{Error, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Result of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub records_written: usize,
    pub bytes_written: u64,
}

/// Streaming writer for one flat file
pub struct LduserWriter {
    destination: PathBuf,
    out: BufWriter<NamedTempFile>,
    records_written: usize,
}

impl LduserWriter {
    /// Start a new flat file that will replace `destination` on finish
    pub fn create(destination: &Path) -> Result<Self> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp = NamedTempFile::new_in(&dir).map_err(|e| {
            Error::io(
                format!("cannot create temporary output in {}", dir.display()),
                e,
            )
        })?;
        debug!(
            "Writing {} via {}",
            destination.display(),
            temp.path().display()
        );

        Ok(Self {
            destination: destination.to_path_buf(),
            out: BufWriter::new(temp),
            records_written: 0,
        })
    }

    /// Append one user document
    pub fn write_record(&mut self, record: &UserRecord) -> Result<()> {
        render_record(record, &mut self.out).map_err(|e| {
            Error::io(
                format!("failed writing record for {}", record.user_id),
                e,
            )
        })?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of documents written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush and move the file into place
    pub fn finish(self) -> Result<WriteSummary> {
        let temp = self
            .out
            .into_inner()
            .map_err(|e| Error::io("failed to flush output", e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io("failed to sync output", e))?;

        let file = temp.persist(&self.destination).map_err(|e| {
            Error::io(
                format!("cannot replace {}", self.destination.display()),
                e.error,
            )
        })?;
        let bytes_written = file
            .metadata()
            .map_err(|e| Error::io("cannot stat output", e))?
            .len();

        info!(
            "Wrote {} records to {}",
            self.records_written,
            self.destination.display()
        );

        Ok(WriteSummary {
            path: self.destination,
            records_written: self.records_written,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::RecordLine;
    use tempfile::TempDir;

    fn record(id: &str) -> UserRecord {
        UserRecord {
            user_id: id.to_string(),
            lines: vec![RecordLine::new("USER_ID", id)],
        }
    }

    #[test]
    fn test_finish_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("LDUSER.txt");
        std::fs::write(&dest, "old contents").unwrap();

        let mut writer = LduserWriter::create(&dest).unwrap();
        writer.write_record(&record("S1")).unwrap();
        writer.write_record(&record("S2")).unwrap();
        assert_eq!(writer.records_written(), 2);

        let summary = writer.finish().unwrap();
        let text = std::fs::read_to_string(&dest).unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.bytes_written, text.len() as u64);
        assert_eq!(text.matches("*** DOCUMENT BOUNDARY ***").count(), 2);
        assert!(text.find("|aS1").unwrap() < text.find("|aS2").unwrap());
    }

    #[test]
    fn test_dropped_writer_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("LDUSER.txt");
        std::fs::write(&dest, "old contents").unwrap();

        {
            let mut writer = LduserWriter::create(&dest).unwrap();
            writer.write_record(&record("S1")).unwrap();
        }

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old contents");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_empty_file_when_no_records() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("LDUSER.txt");

        let summary = LduserWriter::create(&dest).unwrap().finish().unwrap();

        assert_eq!(summary.records_written, 0);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "");
    }
}

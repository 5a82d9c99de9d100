//! CSV reader for student exports

use crate::app::models::StudentRow;
use crate::constants::REQUIRED_COLUMNS;
use crate::{Error, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A row together with its 1-based position among the data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedRow {
    pub row: usize,
    pub student: StudentRow,
}

/// Streaming reader over a student CSV export
pub struct StudentCsvReader<R: Read> {
    reader: Reader<R>,
    source: String,
}

impl StudentCsvReader<File> {
    /// Open a CSV file and check its header
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("cannot open input file {}", path.display()), e))?;
        Self::from_reader(file, path.display().to_string())
    }
}

impl<R: Read> StudentCsvReader<R> {
    /// Wrap any reader; `source` names the input in error messages
    pub fn from_reader(input: R, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let headers = reader.headers().map_err(|e| {
            Error::csv_parsing(&source, "cannot read header row", Some(e))
        })?;
        check_headers(headers, &source)?;
        debug!("Header of {} has {} columns", source, headers.len());

        Ok(Self { reader, source })
    }

    /// Name of the input used in error messages
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the reader, yielding rows in file order
    ///
    /// A row that cannot be decoded (wrong field count, bad UTF-8) yields an
    /// error carrying its line number; iteration may continue past it.
    pub fn rows(self) -> impl Iterator<Item = Result<NumberedRow>> {
        let source = self.source;
        self.reader
            .into_deserialize::<StudentRow>()
            .enumerate()
            .map(move |(index, result)| {
                result
                    .map(|student| NumberedRow {
                        row: index + 1,
                        student,
                    })
                    .map_err(|e| {
                        let line = e
                            .position()
                            .map(|p| p.line().to_string())
                            .unwrap_or_else(|| "?".to_string());
                        Error::csv_parsing(
                            &source,
                            format!("row {} (line {}) is malformed", index + 1, line),
                            Some(e),
                        )
                    })
            })
    }
}

fn check_headers(headers: &StringRecord, source: &str) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h.trim() == *column))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::csv_parsing(
            source,
            format!("missing required column(s): {}", missing.join(", ")),
            None,
        ))
    }
}

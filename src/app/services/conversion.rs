//! End-to-end conversion of one student export into one flat file
//!
//! Rows are read, transformed, and written in a single pass. Every row is
//! checked even after a failure so that the operator sees all problems at
//! once, but the output file is only replaced when every row succeeded.

use crate::app::services::lduser_writer::LduserWriter;
use crate::app::services::record_transformer::RecordTransformer;
use crate::app::services::student_csv::StudentCsvReader;
use crate::{Error, Result, RowFailure};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Statistics for a completed conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    /// Number of data rows read from the input
    pub rows_read: usize,
    /// Number of user documents written (always equal to `rows_read`)
    pub records_written: usize,
    /// Size of the produced flat file
    pub bytes_written: u64,
    /// Path of the produced flat file
    pub output: PathBuf,
}

/// Convert the CSV at `input` into a flat file at `output`
pub fn convert_file(
    input: &Path,
    output: &Path,
    transformer: &RecordTransformer<'_>,
) -> Result<ConversionStats> {
    info!("Converting {} -> {}", input.display(), output.display());
    let reader = StudentCsvReader::open(input)?;
    convert(reader, output, transformer)
}

/// Convert rows from an open reader into a flat file at `output`
pub fn convert<R: Read>(
    reader: StudentCsvReader<R>,
    output: &Path,
    transformer: &RecordTransformer<'_>,
) -> Result<ConversionStats> {
    let mut writer = LduserWriter::create(output)?;
    let mut failures: Vec<RowFailure> = Vec::new();
    let mut rows_read = 0;

    for item in reader.rows() {
        rows_read += 1;

        let numbered = match item {
            Ok(numbered) => numbered,
            Err(e) => {
                failures.push(RowFailure {
                    row: rows_read,
                    student_id: None,
                    reason: failure_reason(&e),
                });
                continue;
            }
        };

        match transformer.transform(&numbered.student) {
            // Once a row has failed nothing will be persisted; keep validating only
            Ok(record) if failures.is_empty() => writer.write_record(&record)?,
            Ok(_) => {}
            Err(e) if e.is_input_error() => {
                let id = numbered.student.student_id.trim();
                failures.push(RowFailure {
                    row: numbered.row,
                    student_id: (!id.is_empty()).then(|| id.to_string()),
                    reason: failure_reason(&e),
                });
            }
            Err(e) => return Err(e),
        }
    }

    if !failures.is_empty() {
        for failure in &failures {
            error!("Rejected {}", failure);
        }
        debug!("Discarding partial output for {}", output.display());
        return Err(Error::invalid_rows(rows_read, failures));
    }

    let summary = writer.finish()?;

    Ok(ConversionStats {
        rows_read,
        records_written: summary.records_written,
        bytes_written: summary.bytes_written,
        output: summary.path,
    })
}

fn failure_reason(error: &Error) -> String {
    match error {
        Error::DataValidation { message } => message.clone(),
        Error::CsvParsing {
            message,
            source: Some(source),
            ..
        } => format!("{} ({})", message, source),
        Error::CsvParsing { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

//! Integration tests for the full conversion run
//!
//! These tests copy the fixtures under tests/data into a scratch directory
//! laid out like a deployment (`config/symphony.toml` next to the data files)
//! and drive the same entry point the CLI uses.

use chrono::{DateTime, Local, TimeZone};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use symphony_lduser::app::services::record_transformer::RecordTransformer;
use symphony_lduser::app::services::sftp_transfer::{FileTransfer, TransferSummary};
use symphony_lduser::cli::commands::execute;
use symphony_lduser::{Config, Error, Result};
use tempfile::TempDir;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");

/// Reference year the golden file was produced with
const GOLDEN_YEAR: i32 = 2026;

/// Records uploads instead of talking to a server
#[derive(Default)]
struct RecordingTransfer {
    uploads: RefCell<Vec<PathBuf>>,
}

impl FileTransfer for RecordingTransfer {
    fn upload(&self, local: &Path) -> Result<TransferSummary> {
        self.uploads.borrow_mut().push(local.to_path_buf());
        Ok(TransferSummary {
            remote_path: PathBuf::from("./LDUSER.txt"),
            bytes: std::fs::metadata(local).map(|m| m.len()).unwrap_or(0),
        })
    }
}

/// Upload that always fails
struct FailingTransfer;

impl FileTransfer for FailingTransfer {
    fn upload(&self, _local: &Path) -> Result<TransferSummary> {
        Err(Error::transfer("host key for sftp.example.com does not match"))
    }
}

fn deployment() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("config")).unwrap();
    std::fs::copy(
        Path::new(FIXTURES).join("config/symphony.toml"),
        dir.path().join("config/symphony.toml"),
    )
    .unwrap();
    std::fs::copy(
        Path::new(FIXTURES).join("students.csv"),
        dir.path().join("students.csv"),
    )
    .unwrap();

    let config = Config::load(&dir.path().join("config/symphony.toml")).unwrap();
    (dir, config)
}

fn at(second: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 10, 16, 7, 0, second)
        .single()
        .unwrap()
}

#[test]
fn test_golden_file() {
    let (dir, config) = deployment();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);

    let summary = execute(&config, &transformer, None, at(0), false).unwrap();

    let expected = std::fs::read(Path::new(FIXTURES).join("expected_LDUSER.txt")).unwrap();
    let actual = std::fs::read(dir.path().join("LDUSER.txt")).unwrap();

    assert_eq!(
        String::from_utf8_lossy(&actual),
        String::from_utf8_lossy(&expected)
    );
    assert_eq!(actual, expected);
    assert_eq!(summary.conversion.rows_read, 3);
    assert_eq!(summary.conversion.records_written, 3);
    assert!(summary.transfer.is_none());
}

#[test]
fn test_archive_copy_and_retention() {
    let (dir, config) = deployment();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);

    for second in 0..3 {
        execute(&config, &transformer, None, at(second), false).unwrap();
    }

    let archive_dir = dir.path().join("generated_ascii");
    let mut names: Vec<String> = std::fs::read_dir(&archive_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    // keep = 2 in the fixture config
    assert_eq!(
        names,
        vec!["LDUSER-20261016-070001.txt", "LDUSER-20261016-070002.txt"]
    );
    assert_eq!(
        std::fs::read(archive_dir.join(&names[1])).unwrap(),
        std::fs::read(dir.path().join("LDUSER.txt")).unwrap()
    );
}

#[test]
fn test_upload_receives_output_file() {
    let (dir, config) = deployment();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);
    let transfer = RecordingTransfer::default();

    let summary = execute(&config, &transformer, Some(&transfer), at(0), false).unwrap();

    assert_eq!(
        *transfer.uploads.borrow(),
        vec![dir.path().join("LDUSER.txt")]
    );
    assert!(summary.transfer.unwrap().bytes > 0);
}

#[test]
fn test_upload_failure_fails_run_after_writing() {
    let (dir, config) = deployment();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);

    let err = execute(&config, &transformer, Some(&FailingTransfer), at(0), false).unwrap_err();

    assert!(matches!(err, Error::Transfer { .. }));
    assert!(dir.path().join("LDUSER.txt").exists());
}

#[test]
fn test_bad_row_fails_run_and_keeps_previous_output() {
    let (dir, config) = deployment();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);
    execute(&config, &transformer, None, at(0), false).unwrap();
    let previous = std::fs::read(dir.path().join("LDUSER.txt")).unwrap();

    let mut csv = std::fs::read_to_string(dir.path().join("students.csv")).unwrap();
    csv.push_str(",NO,ID,20100101,9,,,,,,,\n");
    std::fs::write(dir.path().join("students.csv"), csv).unwrap();

    let err = execute(&config, &transformer, None, at(1), false).unwrap_err();

    assert!(err.is_input_error());
    assert!(err.to_string().contains("row 4"));
    assert_eq!(
        std::fs::read(dir.path().join("LDUSER.txt")).unwrap(),
        previous
    );
    // No archive entry for the failed run
    assert!(
        !dir.path()
            .join("generated_ascii/LDUSER-20261016-070001.txt")
            .exists()
    );
}

#[test]
fn test_missing_input_file() {
    let (dir, config) = deployment();
    std::fs::remove_file(dir.path().join("students.csv")).unwrap();
    let transformer = RecordTransformer::new(&config.data, GOLDEN_YEAR);

    let err = execute(&config, &transformer, None, at(0), false).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

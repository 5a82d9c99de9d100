//! Symphony LDUSER Converter Library
//!
//! A Rust library for converting student-record CSV exports into the
//! SirsiDynix Symphony LDUSER flat file format consumed by the "load users"
//! report, with optional SFTP delivery of the finished file.
//!
//! This library provides tools for:
//! - Reading student rows from CSV in a single streaming pass
//! - Normalizing zip codes, phone numbers and graduation years
//! - Laying out each user as a fixed-order LDUSER record
//! - Writing the flat file atomically and archiving previous runs
//! - Uploading the result over SFTP with known-hosts verification

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod conversion;
        pub mod lduser_writer;
        pub mod record_transformer;
        pub mod report_archive;
        pub mod sftp_transfer;
        pub mod student_csv;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{RecordLine, StudentRow, UserRecord};
pub use config::Config;

/// Result type alias for the LDUSER converter
pub type Result<T> = std::result::Result<T, Error>;

/// A single input row that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// Student id as read from the row, if any
    pub student_id: Option<String>,
    /// Human-readable reason
    pub reason: String,
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.student_id {
            Some(id) => write!(f, "row {} (student {}): {}", self.row, id, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

/// Error types for LDUSER conversion operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error for a single row
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// One or more rows failed validation; nothing was written
    #[error("{} of {total} rows failed validation:\n{}", .failures.len(), format_failures(.failures))]
    InvalidRows {
        total: usize,
        failures: Vec<RowFailure>,
    },

    /// SFTP transfer error
    #[error("Transfer error: {message}")]
    Transfer {
        message: String,
        #[source]
        source: Option<ssh2::Error>,
    },
}

fn format_failures(failures: &[RowFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create the aggregate row failure error
    pub fn invalid_rows(total: usize, failures: Vec<RowFailure>) -> Self {
        Self::InvalidRows { total, failures }
    }

    /// Create a transfer error without an underlying SSH error
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transfer error wrapping an SSH error
    pub fn transfer_ssh(message: impl Into<String>, source: ssh2::Error) -> Self {
        Self::Transfer {
            message: message.into(),
            source: Some(source),
        }
    }

    /// True for errors caused by the input data rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::CsvParsing { .. } | Self::DataValidation { .. } | Self::InvalidRows { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}

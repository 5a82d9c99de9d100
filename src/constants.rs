//! Application constants for the LDUSER converter
//!
//! This module contains the fixed markers of the Symphony flat file format,
//! default paths, and the derivation constants used by the record transformer.

// =============================================================================
// LDUSER Flat File Format
// =============================================================================

/// Line that opens every user document in a flat file
pub const DOCUMENT_BOUNDARY: &str = "*** DOCUMENT BOUNDARY ***";

/// Form declaration that follows the boundary line
pub const FORM_LINE: &str = "FORM=LDUSER";

/// Padding written between a field marker and its value
pub const VALUE_PADDING: &str = "   ";

/// Subfield prefix for a value
pub const VALUE_PREFIX: &str = "|a";

/// Marker substrings that denote a block delimiter rather than a value field
pub const BLOCK_MARKERS: &[&str] = &["_BEGIN", "_END"];

/// Mailing address slot every user is written into ("address type 1")
pub const MAILING_ADDRESS_SLOT: &str = "1";

/// Number of trailing characters of the user id used as the initial PIN
pub const PIN_LENGTH: usize = 4;

// =============================================================================
// Graduation Year Derivation
// =============================================================================

/// Grade level that graduates in the reference year
pub const GRADUATING_GRADE: i32 = 12;

/// Expected birthdate layout (YYYYMMDD)
pub const BIRTHDATE_FORMAT: &str = "%Y%m%d";

// =============================================================================
// Input Columns
// =============================================================================

/// Columns every input CSV must provide
pub const REQUIRED_COLUMNS: &[&str] = &[
    "student_id",
    "first_name",
    "last_name",
    "birthdate",
    "grade",
    "grad_year",
    "street",
    "city",
    "state",
    "zip",
    "email",
    "phone_number",
];

// =============================================================================
// Paths and Archive
// =============================================================================

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "symphony-lduser";

/// Config directory looked up next to the working directory
pub const LOCAL_CONFIG_DIR: &str = "config";

/// Config file name inside the local config directory
pub const LOCAL_CONFIG_FILE: &str = "symphony.toml";

/// Config file name inside the user config directory
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Default directory for timestamped copies of generated files
pub const DEFAULT_ARCHIVE_DIR: &str = "generated_ascii";

/// Default number of archived reports to retain
pub const DEFAULT_ARCHIVE_KEEP: usize = 10;

/// File name prefix of archived reports
pub const ARCHIVE_FILE_PREFIX: &str = "LDUSER-";

/// Timestamp layout used in archived report names
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

// =============================================================================
// SFTP Defaults
// =============================================================================

/// Default SSH port
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Default remote directory (the login directory)
pub const DEFAULT_REMOTE_DIR: &str = ".";

/// Default known hosts file name, relative to the config directory
pub const DEFAULT_KNOWN_HOSTS: &str = "known_hosts";

/// TCP connect timeout for the SFTP server
pub const SFTP_CONNECT_TIMEOUT_SECS: u64 = 30;

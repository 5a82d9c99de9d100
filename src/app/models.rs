//! Data models for LDUSER conversion
//!
//! This module contains the input row read from the student-information export
//! and the ordered record that is rendered into the Symphony flat file.

use crate::constants::BLOCK_MARKERS;
use serde::{Deserialize, Serialize};

// =============================================================================
// Input Row
// =============================================================================

/// One student as exported by the student information system
///
/// Every field is kept as the raw string from the CSV. Validation and
/// normalization happen in the record transformer so that a bad value can be
/// reported against its row instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudentRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,

    /// Birthdate as YYYYMMDD
    pub birthdate: String,

    /// Grade level, an integer without leading zero
    pub grade: String,

    /// Graduation year; blank when the SIS has not assigned one yet
    pub grad_year: String,

    pub street: String,
    pub city: String,
    pub state: String,

    /// Zip code, possibly with a "+4" extension after a hyphen
    pub zip: String,

    pub email: String,

    /// Phone number formatted as (NNN)NNN-NNNN
    pub phone_number: String,
}

impl StudentRow {
    /// Return a copy with trailing whitespace stripped from every field
    pub fn trimmed(&self) -> Self {
        let t = |s: &String| s.trim_end().to_string();
        Self {
            student_id: t(&self.student_id),
            first_name: t(&self.first_name),
            last_name: t(&self.last_name),
            birthdate: t(&self.birthdate),
            grade: t(&self.grade),
            grad_year: t(&self.grad_year),
            street: t(&self.street),
            city: t(&self.city),
            state: t(&self.state),
            zip: t(&self.zip),
            email: t(&self.email),
            phone_number: t(&self.phone_number),
        }
    }
}

// =============================================================================
// Output Record
// =============================================================================

/// One line of an LDUSER document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLine {
    /// `.MARKER.   |avalue`
    Field { marker: &'static str, value: String },
    /// `.MARKER.` opening or closing a block such as an address
    Block { marker: &'static str },
}

impl RecordLine {
    /// Build a line for `marker`, treating `_BEGIN`/`_END` markers as block delimiters
    pub fn new(marker: &'static str, value: impl Into<String>) -> Self {
        if is_block_marker(marker) {
            Self::Block { marker }
        } else {
            Self::Field {
                marker,
                value: value.into(),
            }
        }
    }

    /// The field marker of this line
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Field { marker, .. } | Self::Block { marker } => *marker,
        }
    }

    /// The value of this line, `None` for block delimiters
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Field { value, .. } => Some(value),
            Self::Block { .. } => None,
        }
    }
}

/// True when the marker opens or closes a block
pub fn is_block_marker(marker: &str) -> bool {
    BLOCK_MARKERS.iter().any(|m| marker.contains(m))
}

/// A fully laid out user document, in flat file field order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Symphony user id this document creates or updates
    pub user_id: String,
    pub lines: Vec<RecordLine>,
}

impl UserRecord {
    /// Look up the value written for a marker
    pub fn get(&self, marker: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.marker() == marker)
            .and_then(RecordLine::value)
    }

    /// Markers in the order they will be written
    pub fn markers(&self) -> Vec<&'static str> {
        self.lines.iter().map(RecordLine::marker).collect()
    }
}

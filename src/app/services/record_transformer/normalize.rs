//! Field normalization rules
//!
//! Small, pure helpers that reshape SIS values into what Symphony accepts.

use crate::constants::{BIRTHDATE_FORMAT, GRADUATING_GRADE, PIN_LENGTH};
use crate::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Drop a "+4" extension, keeping everything before the first hyphen
pub fn normalize_zip(zip: &str) -> &str {
    zip.split('-').next().unwrap_or(zip)
}

/// Replace the punctuation of `(NNN)NNN-NNNN` with spaces
///
/// Digits are left where they are and not validated.
pub fn normalize_phone(phone: &str) -> String {
    phone.replace(['(', ')', '-'], " ")
}

/// Graduation year for a student
///
/// A supplied year is passed through unchanged. Otherwise the year is
/// extrapolated from the grade, assuming the graduating grade finishes in
/// `reference_year`.
pub fn derive_grad_year(grad_year: &str, grade: &str, reference_year: i32) -> Result<String> {
    if !grad_year.is_empty() {
        return Ok(grad_year.to_string());
    }

    let parsed = parse_grade(grade)?;
    GRADUATING_GRADE
        .checked_sub(parsed)
        .and_then(|years_left| reference_year.checked_add(years_left))
        .map(|year| year.to_string())
        .ok_or_else(|| Error::data_validation(format!("grade '{}' is out of range", grade.trim())))
}

/// Parse a grade level
pub fn parse_grade(grade: &str) -> Result<i32> {
    let trimmed = grade.trim();
    if trimmed.is_empty() {
        return Err(Error::data_validation("grade is missing"));
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| Error::data_validation(format!("grade '{}' is not an integer", trimmed)))
}

fn birthdate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{8}$").expect("static regex"))
}

/// Check that a birthdate is an 8-digit YYYYMMDD calendar date
pub fn validate_birthdate(birthdate: &str) -> Result<NaiveDate> {
    if !birthdate_pattern().is_match(birthdate) {
        return Err(Error::data_validation(format!(
            "birthdate '{}' is not in YYYYMMDD format",
            birthdate
        )));
    }

    NaiveDate::parse_from_str(birthdate, BIRTHDATE_FORMAT).map_err(|e| {
        Error::data_validation(format!("birthdate '{}' is not a valid date ({})", birthdate, e))
    })
}

/// Initial PIN: the last characters of the user id
pub fn user_pin(user_id: &str) -> String {
    let count = user_id.chars().count();
    user_id
        .chars()
        .skip(count.saturating_sub(PIN_LENGTH))
        .collect()
}

//! Test helpers for the record transformer
//!
//! Shared fixtures for the normalization and transformation tests.

use crate::app::models::StudentRow;
use crate::config::StaticFields;
use std::collections::BTreeMap;


/// Reference year used by every transformer test
pub const TEST_YEAR: i32 = 2026;

/// Static fields with every key the layout needs
pub fn sample_fields() -> StaticFields {
    let fields: BTreeMap<String, String> = [
        ("USER_ROUTING_FLAG", "Y"),
        ("USER_NAME_DSP_PREF", "0"),
        ("USER_LIBRARY", "MAIN"),
        ("USER_PROFILE", "STUDENT"),
        ("USER_ACCESS", "PUBLIC"),
        ("USER_ENVIRONMENT", "PUBLIC"),
        ("USER_CATEGORY1", "STUDENT"),
        ("USER_CATEGORY11", "DISTRICT"),
        ("USER_STATUS", "OK"),
        ("NOTIFY_VIA", "EMAIL"),
        ("USER_CHG_HIST_RULE", "ALLCHARGES"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    StaticFields {
        id_prefix: "S".to_string(),
        expire_day: "0630".to_string(),
        fields,
    }
}

/// A complete, valid student row
pub fn sample_row() -> StudentRow {
    StudentRow {
        student_id: "100234".to_string(),
        first_name: "JANE".to_string(),
        last_name: "DOE".to_string(),
        birthdate: "20100315".to_string(),
        grade: "9".to_string(),
        grad_year: String::new(),
        street: "12 ELM ST".to_string(),
        city: "SPRINGFIELD".to_string(),
        state: "IL".to_string(),
        zip: "62701-1234".to_string(),
        email: "jane.doe@example.org".to_string(),
        phone_number: "(217)555-0142".to_string(),
    }
}

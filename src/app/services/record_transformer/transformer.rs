//! Row to record transformation
//!
//! [`RecordTransformer`] validates one [`StudentRow`], applies the
//! normalization rules, and lays the values out according to
//! [`LDUSER_LAYOUT`](super::layout::LDUSER_LAYOUT).

use super::layout::{FieldSource, LDUSER_LAYOUT};
use super::normalize::{
    derive_grad_year, normalize_phone, normalize_zip, parse_grade, user_pin, validate_birthdate,
};
use crate::app::models::{RecordLine, StudentRow, UserRecord};
use crate::config::StaticFields;
use crate::{Error, Result};
use chrono::Datelike;
use tracing::trace;

/// Maps student rows onto LDUSER records
///
/// Holds only read-only state: the static field values and the year that the
/// graduating grade finishes in. Rows are independent of each other.
#[derive(Debug, Clone)]
pub struct RecordTransformer<'a> {
    fields: &'a StaticFields,
    reference_year: i32,
}

impl<'a> RecordTransformer<'a> {
    /// Create a transformer with an explicit reference year
    pub fn new(fields: &'a StaticFields, reference_year: i32) -> Self {
        Self {
            fields,
            reference_year,
        }
    }

    /// Create a transformer that treats the current local year as the reference
    pub fn for_current_year(fields: &'a StaticFields) -> Self {
        Self::new(fields, chrono::Local::now().year())
    }

    /// Year the graduating grade finishes in
    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Transform one row into a complete record
    pub fn transform(&self, row: &StudentRow) -> Result<UserRecord> {
        let row = row.trimmed();
        Self::check_required(&row)?;
        validate_birthdate(&row.birthdate)?;
        parse_grade(&row.grade)?;

        let user_id = format!("{}{}", self.fields.id_prefix, row.student_id);
        let grad_year = derive_grad_year(&row.grad_year, &row.grade, self.reference_year)?;

        let mut lines = Vec::with_capacity(LDUSER_LAYOUT.len());
        for field in LDUSER_LAYOUT {
            let value = match field.source {
                FieldSource::UserId => user_id.clone(),
                FieldSource::Pin => user_pin(&user_id),
                FieldSource::FirstName => row.first_name.clone(),
                FieldSource::LastName => row.last_name.clone(),
                FieldSource::BirthDate => row.birthdate.clone(),
                FieldSource::GradYear => grad_year.clone(),
                FieldSource::PrivExpires => format!("{}{}", grad_year, self.fields.expire_day),
                FieldSource::Street => row.street.clone(),
                FieldSource::CityState => format!("{} {}", row.city, row.state),
                FieldSource::Zip => normalize_zip(&row.zip).to_string(),
                FieldSource::Phone => normalize_phone(&row.phone_number),
                FieldSource::Email => row.email.clone(),
                FieldSource::Literal(value) => value.to_string(),
                FieldSource::Static => self
                    .fields
                    .get(field.marker)
                    .ok_or_else(|| {
                        Error::configuration(format!(
                            "[data] has no value for {}",
                            field.marker
                        ))
                    })?
                    .to_string(),
                FieldSource::Block => String::new(),
            };
            lines.push(RecordLine::new(field.marker, value));
        }

        trace!("Transformed student {} into {}", row.student_id, user_id);

        Ok(UserRecord { user_id, lines })
    }

    fn check_required(row: &StudentRow) -> Result<()> {
        let required = [
            ("student_id", &row.student_id),
            ("first_name", &row.first_name),
            ("last_name", &row.last_name),
            ("birthdate", &row.birthdate),
            ("grade", &row.grade),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::data_validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

//! Record transformer for Symphony user loads
//!
//! Turns one student row plus the static configuration into one LDUSER
//! document. This is the only place that knows the Symphony field rules.
//!
//! ## Architecture
//!
//! - [`layout`] - Field order and value origin of an LDUSER document
//! - [`normalize`] - Zip, phone, grade and graduation year rules
//! - [`transformer`] - Validation and assembly of a [`UserRecord`](crate::UserRecord)
//!
//! ## Usage
//!
//! ```rust
//! use symphony_lduser::app::services::record_transformer::RecordTransformer;
//! use symphony_lduser::config::StaticFields;
//! use symphony_lduser::StudentRow;
//!
//! # fn example(fields: &StaticFields, row: &StudentRow) -> symphony_lduser::Result<()> {
//! let transformer = RecordTransformer::new(fields, 2026);
//! let record = transformer.transform(row)?;
//! println!("{} has {} lines", record.user_id, record.lines.len());
//! # Ok(())
//! # }
//! ```

pub mod layout;
pub mod normalize;
pub mod transformer;

#[cfg(test)]
pub mod tests;

pub use layout::{FieldSource, FieldSpec, LDUSER_LAYOUT};
pub use transformer::RecordTransformer;

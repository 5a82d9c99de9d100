//! Student CSV row source
//!
//! Reads the SIS export as a lazy, single-pass sequence of [`StudentRow`]s in
//! file order.
//!
//! - [`reader`] - Header checks and row deserialization
//!
//! [`StudentRow`]: crate::StudentRow

pub mod reader;

pub use reader::{NumberedRow, StudentCsvReader};

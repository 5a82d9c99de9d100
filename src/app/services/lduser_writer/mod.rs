//! LDUSER flat file sink
//!
//! Renders [`UserRecord`](crate::UserRecord)s in the Symphony flat file
//! syntax and writes them so that the destination only ever holds a complete
//! file.
//!
//! - [`format`] - Line syntax of a user document
//! - [`writer`] - Atomic file writer

pub mod format;
pub mod writer;

pub use format::render_record;
pub use writer::{LduserWriter, WriteSummary};

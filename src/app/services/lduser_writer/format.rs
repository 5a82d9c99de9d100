//! Flat file syntax
//!
//! ```text
//! *** DOCUMENT BOUNDARY ***
//! FORM=LDUSER
//! .USER_ID.   |aS100234
//! .USER_ADDR1_BEGIN.
//! .STREET.   |a12 ELM ST
//! .USER_ADDR1_END.
//!
//! ```

use crate::app::models::{RecordLine, UserRecord};
use crate::constants::{DOCUMENT_BOUNDARY, FORM_LINE, VALUE_PADDING, VALUE_PREFIX};
use std::io::{self, Write};

/// Write one user document, including the trailing blank line
pub fn render_record<W: Write>(record: &UserRecord, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", DOCUMENT_BOUNDARY)?;
    writeln!(out, "{}", FORM_LINE)?;

    for line in &record.lines {
        match line {
            RecordLine::Block { marker } => writeln!(out, ".{}.", marker)?,
            // Symphony rejects values with trailing whitespace
            RecordLine::Field { marker, value } => writeln!(
                out,
                ".{}.{}{}{}",
                marker,
                VALUE_PADDING,
                VALUE_PREFIX,
                value.trim_end()
            )?,
        }
    }

    writeln!(out)
}

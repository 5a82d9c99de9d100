//! LDUSER record grammar
//!
//! The order and origin of every field in a user document. Symphony matches
//! fields by marker, but the load report is picky about blocks, so the order
//! here is the order written to the flat file.

/// Where the value of a field comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// `id_prefix` + student id
    UserId,
    /// Last characters of the user id
    Pin,
    FirstName,
    LastName,
    BirthDate,
    /// Supplied or derived graduation year
    GradYear,
    /// Graduation year + configured `expire_day`
    PrivExpires,
    Street,
    /// City and state separated by a space
    CityState,
    /// Zip without extension
    Zip,
    /// Phone with punctuation replaced by spaces
    Phone,
    Email,
    /// Fixed value baked into the grammar
    Literal(&'static str),
    /// Value read from `[data]` under the field's own marker
    Static,
    /// `_BEGIN`/`_END` block delimiter
    Block,
}

/// One entry of the record grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub marker: &'static str,
    pub source: FieldSource,
}

const fn field(marker: &'static str, source: FieldSource) -> FieldSpec {
    FieldSpec { marker, source }
}

/// Field layout of an LDUSER document
pub const LDUSER_LAYOUT: &[FieldSpec] = &[
    field("USER_ID", FieldSource::UserId),
    field("USER_ROUTING_FLAG", FieldSource::Static),
    field("USER_FIRST_NAME", FieldSource::FirstName),
    field("USER_LAST_NAME", FieldSource::LastName),
    field("USER_NAME_DSP_PREF", FieldSource::Static),
    field("USER_BIRTH_DATE", FieldSource::BirthDate),
    field("USER_LIBRARY", FieldSource::Static),
    field("USER_PROFILE", FieldSource::Static),
    field("USER_PIN", FieldSource::Pin),
    field("USER_ACCESS", FieldSource::Static),
    field("USER_ENVIRONMENT", FieldSource::Static),
    field("USER_CATEGORY1", FieldSource::Static),
    field("USER_CATEGORY11", FieldSource::Static),
    field("USER_CATEGORY12", FieldSource::GradYear),
    field("USER_PRIV_EXPIRES", FieldSource::PrivExpires),
    field("USER_STATUS", FieldSource::Static),
    field(
        "USER_MAILINGADDR",
        FieldSource::Literal(crate::constants::MAILING_ADDRESS_SLOT),
    ),
    field("USER_ADDR1_BEGIN", FieldSource::Block),
    field("STREET", FieldSource::Street),
    field("CITY/STATE", FieldSource::CityState),
    field("ZIP", FieldSource::Zip),
    field("PHONE", FieldSource::Phone),
    field("EMAIL", FieldSource::Email),
    field("USER_ADDR1_END", FieldSource::Block),
    field("USER_XINFO_BEGIN", FieldSource::Block),
    field("NOTIFY_VIA", FieldSource::Static),
    field("USER_XINFO_END", FieldSource::Block),
    field("USER_CHG_HIST_RULE", FieldSource::Static),
];

/// Markers whose value must come from the `[data]` configuration section
pub fn static_keys() -> impl Iterator<Item = &'static str> {
    LDUSER_LAYOUT
        .iter()
        .filter(|field| field.source == FieldSource::Static)
        .map(|field| field.marker)
}

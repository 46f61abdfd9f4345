/// Reasons a capture line is rejected as a malformed record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Line does not split into exactly seven comma-separated fields
    #[error("expected {expected} comma-separated fields, found {found}", expected = super::FIELD_COUNT)]
    FieldCount {
        /// Number of fields actually present
        found: usize,
    },

    /// Time field is not a real number
    #[error("invalid time value: {0:?}")]
    InvalidTime(String),

    /// Time field parsed but is NaN or infinite
    #[error("time value is not finite: {0}")]
    NonFiniteTime(f64),

    /// One of the six sensor fields is not an integer
    #[error("invalid ADC code in field {field}: {value:?}")]
    InvalidCode {
        /// 1-based field position within the line
        field: usize,
        /// Raw text of the field
        value: String,
    },
}

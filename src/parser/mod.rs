//! # Line Parser
//!
//! A capture file holds one sample per line, seven comma-separated fields:
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | 1 | float | Time (s) |
//! | 2 | int | p2, patient-side venturi (constriction) |
//! | 3 | int | p1,ins, patient-side venturi (inspiration tap) |
//! | 4 | int | p1,exp, patient-side venturi (expiration tap) |
//! | 5 | int | p2, device-side venturi |
//! | 6 | int | p1,ins, device-side venturi |
//! | 7 | int | p1,exp, device-side venturi |
//!
//! All sensor fields are raw ADC codes. Only the patient-side venturi feeds
//! the analysis, but a line missing the device-side fields is still rejected.
//! Parsing is all-or-nothing: a line either yields a complete [`RawSample`] or
//! a [`ParseError`].

mod error;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::ParseError;

/// Number of fields in a well-formed capture line.
pub const FIELD_COUNT: usize = 7;

/// Field delimiter of the capture format.
pub const DELIMITER: char = ',';

/// One parsed capture line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Sample time (s)
    pub time: f64,

    /// Patient-side constriction pressure (ADC code)
    pub p2_patient_raw: i64,

    /// Patient-side inspiration tap pressure (ADC code)
    pub p1_ins_patient_raw: i64,

    /// Patient-side expiration tap pressure (ADC code)
    pub p1_exp_patient_raw: i64,

    /// Device-side constriction pressure (ADC code)
    pub p2_device_raw: i64,

    /// Device-side inspiration tap pressure (ADC code)
    pub p1_ins_device_raw: i64,

    /// Device-side expiration tap pressure (ADC code)
    pub p1_exp_device_raw: i64,
}

impl RawSample {
    /// Patient-side codes in `(p2, p1_ins, p1_exp)` order.
    pub fn patient_codes(&self) -> (i64, i64, i64) {
        (
            self.p2_patient_raw,
            self.p1_ins_patient_raw,
            self.p1_exp_patient_raw,
        )
    }

    /// Device-side codes in `(p2, p1_ins, p1_exp)` order.
    pub fn device_codes(&self) -> (i64, i64, i64) {
        (
            self.p2_device_raw,
            self.p1_ins_device_raw,
            self.p1_exp_device_raw,
        )
    }

    /// Render the sample back into capture-line form.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RawSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{}",
            self.time,
            self.p2_patient_raw,
            self.p1_ins_patient_raw,
            self.p1_exp_patient_raw,
            self.p2_device_raw,
            self.p1_ins_device_raw,
            self.p1_exp_device_raw
        )
    }
}

impl FromStr for RawSample {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse_line(line)
    }
}

fn parse_code(fields: &[&str], index: usize) -> Result<i64, ParseError> {
    let raw = fields[index];
    raw.trim().parse::<i64>().map_err(|_| ParseError::InvalidCode {
        field: index + 1,
        value: raw.to_string(),
    })
}

/// Parse one capture line into a [`RawSample`].
///
/// Surrounding whitespace of each field, including the line terminator, is
/// ignored.
pub fn parse_line(line: &str) -> Result<RawSample, ParseError> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            found: fields.len(),
        });
    }

    let time_field = fields[0].trim();
    let time: f64 = time_field
        .parse()
        .map_err(|_| ParseError::InvalidTime(fields[0].to_string()))?;
    if !time.is_finite() {
        return Err(ParseError::NonFiniteTime(time));
    }

    Ok(RawSample {
        time,
        p2_patient_raw: parse_code(&fields, 1)?,
        p1_ins_patient_raw: parse_code(&fields, 2)?,
        p1_exp_patient_raw: parse_code(&fields, 3)?,
        p2_device_raw: parse_code(&fields, 4)?,
        p1_ins_device_raw: parse_code(&fields, 5)?,
        p1_exp_device_raw: parse_code(&fields, 6)?,
    })
}

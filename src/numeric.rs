//! Small numeric helpers shared by the analysis stages.

/// Number of decimal places every reported quantity is rounded to.
pub const REPORT_DECIMALS: i32 = 3;

/// Round `value` to `decimals` places, half away from zero.
///
/// Non-finite values pass through unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Round to the reporting precision (3 decimals).
pub fn round3(value: f64) -> f64 {
    round_to(value, REPORT_DECIMALS)
}

//! # Leakage Estimator
//!
//! In a sealed mask, inspired and expired volumes cancel out, so the net
//! integral of the flow rate over a capture measures the volume lost through
//! leaks. The integral is a cumulative trapezoid; trailing NaN entries (from
//! absent flow values at the end of the capture) are trimmed before the last
//! value is read. An absent value in the middle of the capture poisons every
//! later running total, so the estimate then covers the capture only up to
//! that gap.
//!
//! A negative result means more air left the patient than entered. It is a
//! valid estimate; callers are expected to flag it.

mod error;

use crate::breath::Metrics;
use crate::numeric::round3;

pub use error::LeakageError;

/// Running trapezoidal integral of `y` over `x`.
///
/// The result has one entry per interval (`len - 1` entries), entry `i`
/// being the integral from `x[0]` to `x[i + 1]`.
pub fn cumulative_trapezoid(y: &[f64], x: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| {
            total += (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0;
            total
        })
        .collect()
}

/// Net integrated flow (L) of a capture, rounded to 3 decimals.
///
/// Absent flow values are integrated as NaN.
pub fn net_volume(time: &[f64], flow: &[Option<f64>]) -> Result<f64, LeakageError> {
    if time.len() != flow.len() {
        return Err(LeakageError::LengthMismatch {
            time_len: time.len(),
            flow_len: flow.len(),
        });
    }

    let signal: Vec<f64> = flow.iter().map(|q| q.unwrap_or(f64::NAN)).collect();
    let cumulative = cumulative_trapezoid(&signal, time);

    cumulative
        .iter()
        .rev()
        .find(|v| !v.is_nan())
        .map(|&v| round3(v))
        .filter(|v| v.is_finite())
        .ok_or(LeakageError::NoFiniteIntegral {
            samples: time.len(),
        })
}

/// Estimate the leakage volume (L) and store it in `metrics.leakage`.
///
/// `metrics` is left untouched when the estimate fails.
pub fn estimate_leakage(
    time: &[f64],
    flow: &[Option<f64>],
    metrics: &mut Metrics,
) -> Result<f64, LeakageError> {
    let leakage = net_volume(time, flow)?;
    metrics.leakage = Some(leakage);
    Ok(leakage)
}

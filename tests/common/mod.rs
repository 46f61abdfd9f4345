//! Synthetic capture generation shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

/// ADC code of zero pressure for the default calibration.
pub const BASE: i64 = 1638;

/// Capture line for one sample with a signed differential of `counts` ADC
/// codes across the patient-side venturi (positive = inspiration).
pub fn capture_line(time: f64, counts: i64) -> String {
    let (p_ins, p_exp) = if counts >= 0 {
        (BASE + counts, BASE)
    } else {
        (BASE, BASE - counts)
    };
    format!(
        "{},{},{},{},{},{},{}",
        time, BASE, p_ins, p_exp, BASE, BASE, BASE
    )
}

/// 100 Hz capture: `cycles` sinusoidal breaths of `period` samples each,
/// then `rest` samples of zero flow.
pub fn breathing_capture(cycles: usize, period: usize, rest: usize, amplitude: f64) -> Vec<String> {
    let half = period / 2;
    (0..=cycles * period + rest)
        .map(|k| {
            let counts = if k < cycles * period {
                let j = k % period;
                let phase = (j % half) as f64 / half as f64;
                let magnitude = (amplitude * (PI * phase).sin()).round() as i64;
                if j < half {
                    magnitude
                } else {
                    -magnitude
                }
            } else {
                0
            };
            capture_line(k as f64 / 100.0, counts)
        })
        .collect()
}

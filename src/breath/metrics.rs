use serde::{Deserialize, Serialize};

use super::BreathError;
use crate::numeric::round3;

/// Gap between consecutive breaths (s) that counts as one apnea event.
pub const APNEA_GAP_SECONDS: f64 = 10.0;

/// Respiratory metrics of one capture.
///
/// Created by breath detection with `leakage` unset; the leakage estimator
/// fills it in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Time between first and last sample (s)
    pub duration: f64,

    /// Number of detected breaths
    pub breaths: usize,

    /// Average breathing rate (breaths/min)
    pub breath_rate_bpm: f64,

    /// Time of each detected breath (s), ascending
    pub breath_times: Vec<f64>,

    /// Number of gaps between breaths of at least the apnea threshold
    pub apnea_count: usize,

    /// Net mask leakage volume (L), `None` until estimated
    pub leakage: Option<f64>,
}

/// Count the gaps between consecutive breaths that reach `gap_seconds`.
///
/// Each qualifying gap counts once, however long it is.
pub fn count_apneas(breath_times: &[f64], gap_seconds: f64) -> usize {
    breath_times
        .windows(2)
        .filter(|pair| pair[1] - pair[0] >= gap_seconds)
        .count()
}

/// Derive breath metrics from the time series and detected peak indices.
pub fn calculate_metrics(
    time: &[f64],
    peaks: &[usize],
    apnea_gap_s: f64,
) -> Result<Metrics, BreathError> {
    let (first, last) = match (time.first(), time.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(BreathError::EmptySeries),
    };

    let duration = round3(last - first);
    if !(duration > 0.0) {
        return Err(BreathError::NonPositiveDuration(duration));
    }

    let breath_times = peaks
        .iter()
        .map(|&i| {
            time.get(i).copied().ok_or(BreathError::PeakOutOfRange {
                index: i,
                len: time.len(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let breaths = peaks.len();
    let breath_rate_bpm = round3(60.0 * breaths as f64 / duration);
    let apnea_count = count_apneas(&breath_times, apnea_gap_s);

    Ok(Metrics {
        duration,
        breaths,
        breath_rate_bpm,
        breath_times,
        apnea_count,
        leakage: None,
    })
}

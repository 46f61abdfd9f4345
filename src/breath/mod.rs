//! # Breath Detector
//!
//! Finds individual breaths as peaks of the inspiratory flow and derives
//! breath count, breath rate and apnea events from them.
//!
//! A breath is a peak of the flow-rate series that is at least 0.1 L/s high,
//! at least 0.1 L/s prominent, at least 20 samples wide at half prominence
//! and at least 80 samples away from any higher breath (see [`PeakCriteria`]).
//! An apnea event is a gap of 10 s or more between consecutive breaths.

mod error;
mod metrics;
mod peaks;


use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub use error::BreathError;
pub use metrics::{calculate_metrics, count_apneas, Metrics, APNEA_GAP_SECONDS};
pub use peaks::{
    find_peaks, local_maxima, prominence, select_by_distance, width, PeakCriteria, Prominence,
};

/// Thresholds for breath and apnea detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    /// Minimum separation between breaths (samples)
    pub min_distance: usize,

    /// Minimum breath prominence (L/s)
    pub min_prominence: f64,

    /// Minimum peak inspiratory flow (L/s)
    pub min_height: f64,

    /// Minimum breath width at half prominence (samples)
    pub min_width: f64,

    /// Breath-to-breath gap that counts as an apnea (s)
    pub apnea_gap_s: f64,
}

impl Default for BreathConfig {
    fn default() -> Self {
        let criteria = PeakCriteria::default();
        Self {
            min_distance: criteria.min_distance,
            min_prominence: criteria.min_prominence,
            min_height: criteria.min_height,
            min_width: criteria.min_width,
            apnea_gap_s: APNEA_GAP_SECONDS,
        }
    }
}

impl BreathConfig {
    /// Peak search thresholds of this configuration
    pub fn criteria(&self) -> PeakCriteria {
        PeakCriteria {
            min_distance: self.min_distance,
            min_prominence: self.min_prominence,
            min_height: self.min_height,
            min_width: self.min_width,
        }
    }

    /// Check that distances, widths and the apnea gap are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_distance == 0 {
            return Err(ConfigError::InvalidThreshold(
                "min_distance must be at least 1 sample".to_string(),
            ));
        }
        if !(self.min_width >= 0.0) || !self.min_height.is_finite() || !self.min_prominence.is_finite() {
            return Err(ConfigError::InvalidThreshold(
                "peak thresholds must be finite and min_width non-negative".to_string(),
            ));
        }
        if !(self.apnea_gap_s > 0.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "apnea_gap_s must be positive, got {}",
                self.apnea_gap_s
            )));
        }
        Ok(())
    }
}

/// Detected breaths of one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct BreathDetection {
    /// Indices of the detected breath peaks, ascending
    pub peaks: Vec<usize>,
    /// Metrics derived from the peaks, with leakage unset
    pub metrics: Metrics,
}

/// Detect breaths in a flow series and derive the breath metrics.
///
/// Absent flow values never form a breath. Fails if either series is empty,
/// the series differ in length, or the capture duration is not positive.
pub fn detect_breaths(
    time: &[f64],
    flow: &[Option<f64>],
    config: &BreathConfig,
) -> Result<BreathDetection, BreathError> {
    if time.is_empty() || flow.is_empty() {
        return Err(BreathError::EmptySeries);
    }
    if time.len() != flow.len() {
        return Err(BreathError::LengthMismatch {
            time_len: time.len(),
            flow_len: flow.len(),
        });
    }

    let signal: Vec<f64> = flow.iter().map(|q| q.unwrap_or(f64::NAN)).collect();
    let peaks = find_peaks(&signal, &config.criteria());
    let metrics = calculate_metrics(time, &peaks, config.apnea_gap_s)?;

    Ok(BreathDetection { peaks, metrics })
}

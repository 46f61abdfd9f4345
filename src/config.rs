//! Analysis configuration.
//!
//! Every section defaults to the constants of the reference device, so an
//! empty configuration reproduces the standard analysis:
//!
//! ```toml
//! [calibration]
//! adc_zero = 1638
//! adc_full_scale = 14745
//! full_scale_cmh2o = 25.4
//!
//! [venturi]
//! outer_diameter_m = 0.015
//! inner_diameter_m = 0.012
//! air_density = 1.199
//!
//! [breath]
//! min_distance = 80
//! min_prominence = 0.1
//! min_height = 0.1
//! min_width = 20.0
//! apnea_gap_s = 10.0
//!
//! [report]
//! apnea_alert_count = 2
//! ```

use serde::{Deserialize, Serialize};

use crate::breath::BreathConfig;
use crate::flow::VenturiGeometry;
use crate::pressure::Calibration;

/// Errors raised by configuration validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// ADC calibration does not describe an increasing transfer function
    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Venturi dimensions or gas density are not physical
    #[error("Invalid venturi geometry: {0}")]
    InvalidGeometry(String),

    /// A detection threshold is out of range
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Reporting options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Apnea count at which a capture is flagged for attention
    pub apnea_alert_count: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            apnea_alert_count: 2,
        }
    }
}

/// Complete configuration of one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pressure sensor calibration
    pub calibration: Calibration,

    /// Patient-side venturi geometry
    pub venturi: VenturiGeometry,

    /// Breath and apnea detection thresholds
    pub breath: BreathConfig,

    /// Reporting options
    pub report: ReportConfig,
}

impl AnalysisConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        self.venturi.validate()?;
        self.breath.validate()?;
        Ok(())
    }
}

//! # Pressure Converter
//!
//! Maps raw ADC codes from the venturi pressure sensors to pascals using the
//! sensor's linear transfer function:
//!
//! ```text
//! pressure_cmH2O = full_scale_cmH2O / (adc_full_scale - adc_zero) * (adc - adc_zero)
//! pressure_Pa    = pressure_cmH2O * 98.0665
//! ```
//!
//! With the default calibration an ADC code of 1638 reads 0 Pa and 14745
//! reads 25.4 cmH2O.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::numeric::round3;

/// ADC code that corresponds to zero pressure.
pub const ADC_ZERO: i64 = 1638;

/// ADC code that corresponds to the full-scale pressure.
pub const ADC_FULL_SCALE: i64 = 14745;

/// Full-scale pressure of the sensor in cmH2O.
pub const FULL_SCALE_CMH2O: f64 = 25.4;

/// 1 cmH2O expressed in pascals.
pub const PASCALS_PER_CMH2O: f64 = 98.0665;

/// Linear calibration of a pressure sensor's ADC output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// ADC code read at zero pressure
    pub adc_zero: i64,

    /// ADC code read at full-scale pressure
    pub adc_full_scale: i64,

    /// Full-scale pressure in cmH2O
    pub full_scale_cmh2o: f64,

    /// Conversion factor from cmH2O to Pa
    pub pascals_per_cmh2o: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            adc_zero: ADC_ZERO,
            adc_full_scale: ADC_FULL_SCALE,
            full_scale_cmh2o: FULL_SCALE_CMH2O,
            pascals_per_cmh2o: PASCALS_PER_CMH2O,
        }
    }
}

impl Calibration {
    /// Check that the calibration describes an increasing transfer function.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adc_full_scale <= self.adc_zero {
            return Err(ConfigError::InvalidCalibration(format!(
                "adc_full_scale ({}) must be greater than adc_zero ({})",
                self.adc_full_scale, self.adc_zero
            )));
        }
        if !(self.full_scale_cmh2o > 0.0) || !(self.pascals_per_cmh2o > 0.0) {
            return Err(ConfigError::InvalidCalibration(
                "full-scale pressure and unit factor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Pressure per ADC count in cmH2O.
    fn cmh2o_per_count(&self) -> f64 {
        self.full_scale_cmh2o / (self.adc_full_scale as f64 - self.adc_zero as f64)
    }

    /// Convert an ADC reading to pascals, rounded to 3 decimals.
    ///
    /// Returns `None` when `adc` is not a finite number.
    pub fn to_pascals(&self, adc: f64) -> Option<f64> {
        if !adc.is_finite() {
            return None;
        }
        let cmh2o = self.cmh2o_per_count() * (adc - self.adc_zero as f64);
        Some(round3(cmh2o * self.pascals_per_cmh2o))
    }

    /// Convert an integer ADC code to pascals.
    pub fn code_to_pascals(&self, code: i64) -> Option<f64> {
        self.to_pascals(code as f64)
    }
}

/// Convert an ADC reading to pascals with the default sensor calibration.
pub fn adc_to_pressure(adc: f64) -> Option<f64> {
    Calibration::default().to_pascals(adc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_calibration_span_does_not_overflow() {
        let calibration = Calibration {
            adc_zero: -1,
            adc_full_scale: i64::MAX,
            ..Calibration::default()
        };
        assert!(calibration.validate().is_ok());
        assert_eq!(calibration.code_to_pascals(-1), Some(0.0));
        assert!(calibration.code_to_pascals(i64::MAX).unwrap() > 0.0);
    }

    #[test]
    fn test_zero_code_reads_zero() {
        assert_eq!(adc_to_pressure(1638.0), Some(0.0));
    }

    #[test]
    fn test_full_scale_reads_25_4_cmh2o() {
        let pa = adc_to_pressure(14745.0).unwrap();
        assert!((pa - 25.4 * 98.0665).abs() < 1e-3);
    }

    #[test]
    fn test_known_values() {
        // 0.190042 Pa per count
        assert_eq!(adc_to_pressure(1639.0), Some(0.19));
        assert_eq!(adc_to_pressure(1738.0), Some(19.004));
        assert_eq!(adc_to_pressure(1538.0), Some(-19.004));
    }

    #[test]
    fn test_non_finite_is_absent() {
        assert_eq!(adc_to_pressure(f64::NAN), None);
        assert_eq!(adc_to_pressure(f64::INFINITY), None);
    }

    #[test]
    fn test_invalid_calibration() {
        let cal = Calibration {
            adc_full_scale: 1000,
            ..Default::default()
        };
        assert!(cal.validate().is_err());
        assert!(Calibration::default().validate().is_ok());
    }
}

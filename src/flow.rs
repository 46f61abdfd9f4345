//! # Flow Resolver
//!
//! Turns the three calibrated pressures of one venturi into a signed
//! volumetric flow rate.
//!
//! The venturi exposes one tap at the constriction (`p2`) and two upstream
//! taps, one on each side of the constriction. Whichever upstream tap reads
//! higher is upstream for the current direction of flow:
//!
//! - `p_ins >= p_exp`: air moves towards the patient (inspiration, `+`)
//! - `p_ins <  p_exp`: air moves away from the patient (expiration, `-`)
//!
//! The flow rate then follows from Bernoulli's equation for an ideal
//! venturi:
//!
//! ```text
//! Q = sign * A1 * sqrt( (2 / rho) * (p1 - p2) / ((A1 / A2)^2 - 1) )
//! ```
//!
//! with `A1`/`A2` the outer/inner bore areas and `rho` the air density. The
//! result is reported in L/s.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::numeric::round3;

/// Density of air used for the Bernoulli inversion (kg/m^3).
pub const AIR_DENSITY: f64 = 1.199;

/// Diameter of the outer (unconstricted) venturi bore (m).
pub const OUTER_DIAMETER_M: f64 = 0.015;

/// Diameter of the inner (constricted) venturi bore (m).
pub const INNER_DIAMETER_M: f64 = 0.012;

const LITRES_PER_CUBIC_METRE: f64 = 1000.0;

/// Direction of air flow through the venturi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// Flow towards the patient
    Inspiration,
    /// Flow away from the patient
    Expiration,
}

impl FlowDirection {
    /// Sign applied to the flow magnitude (`+1` or `-1`).
    pub fn sign(self) -> f64 {
        match self {
            FlowDirection::Inspiration => 1.0,
            FlowDirection::Expiration => -1.0,
        }
    }
}

/// Upstream pressure selected for one sample, with the flow direction it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Upstream {
    /// Upstream pressure p1 (Pa)
    pub pressure: f64,
    /// Direction of flow
    pub direction: FlowDirection,
}

/// Pick the upstream pressure out of the inspiration and expiration taps.
///
/// Equal readings resolve to inspiration. Returns `None` if either pressure
/// is not a finite number.
pub fn determine_upstream(p_ins: f64, p_exp: f64) -> Option<Upstream> {
    if !p_ins.is_finite() || !p_exp.is_finite() {
        return None;
    }
    let upstream = if p_ins >= p_exp {
        Upstream {
            pressure: p_ins,
            direction: FlowDirection::Inspiration,
        }
    } else {
        Upstream {
            pressure: p_exp,
            direction: FlowDirection::Expiration,
        }
    };
    Some(upstream)
}

/// Cross-sections and fluid density of a venturi flow element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenturiGeometry {
    /// Diameter of the unconstricted bore (m)
    pub outer_diameter_m: f64,

    /// Diameter of the constriction (m)
    pub inner_diameter_m: f64,

    /// Density of the gas (kg/m^3)
    pub air_density: f64,
}

impl Default for VenturiGeometry {
    fn default() -> Self {
        Self {
            outer_diameter_m: OUTER_DIAMETER_M,
            inner_diameter_m: INNER_DIAMETER_M,
            air_density: AIR_DENSITY,
        }
    }
}

impl VenturiGeometry {
    /// Check that the constriction is narrower than the bore and density is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.inner_diameter_m > 0.0) || !(self.outer_diameter_m > self.inner_diameter_m) {
            return Err(ConfigError::InvalidGeometry(format!(
                "inner diameter ({} m) must be positive and smaller than outer diameter ({} m)",
                self.inner_diameter_m, self.outer_diameter_m
            )));
        }
        if !(self.air_density > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "air density must be positive, got {}",
                self.air_density
            )));
        }
        Ok(())
    }

    /// Area of the outer bore (m^2).
    pub fn outer_area(&self) -> f64 {
        PI * (self.outer_diameter_m / 2.0).powi(2)
    }

    /// Area of the constriction (m^2).
    pub fn inner_area(&self) -> f64 {
        PI * (self.inner_diameter_m / 2.0).powi(2)
    }

    /// Signed volumetric flow in L/s, rounded to 3 decimals.
    ///
    /// `p2` is the constriction pressure, `p_ins`/`p_exp` the two upstream
    /// taps, all in pascals. Returns `None` if any pressure is not finite or
    /// if the upstream pressure is below the constriction pressure (the
    /// Bernoulli relation has no real solution).
    pub fn volumetric_flow(&self, p2: f64, p_ins: f64, p_exp: f64) -> Option<f64> {
        if !p2.is_finite() {
            return None;
        }
        let upstream = determine_upstream(p_ins, p_exp)?;

        let a1 = self.outer_area();
        let a2 = self.inner_area();
        let radicand =
            (2.0 / self.air_density) * (upstream.pressure - p2) / ((a1 / a2).powi(2) - 1.0);
        if radicand < 0.0 || !radicand.is_finite() {
            return None;
        }

        let flow = LITRES_PER_CUBIC_METRE * upstream.direction.sign() * a1 * radicand.sqrt();
        Some(round3(flow))
    }
}

/// Signed volumetric flow (L/s) through the default patient-side venturi.
pub fn volumetric_flow(p2: f64, p_ins: f64, p_exp: f64) -> Option<f64> {
    VenturiGeometry::default().volumetric_flow(p2, p_ins, p_exp)
}

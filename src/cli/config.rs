//! TOML configuration file support.
//!
//! Every analysis setting can be overridden from a config file; omitted
//! sections keep the device defaults:
//!
//! ```toml
//! # cpapflow.toml
//! [calibration]
//! adc_zero = 1638
//! adc_full_scale = 14745
//!
//! [breath]
//! min_distance = 80
//! apnea_gap_s = 10.0
//!
//! [report]
//! apnea_alert_count = 2
//!
//! [output]
//! directory = "results"
//! plot_width = 1200
//! plot_height = 600
//! ```

use anyhow::{Context, Result};
use cpapflow::config::AnalysisConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for cpapflow.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Analysis sections (calibration, venturi, breath, report).
    #[serde(flatten)]
    pub analysis: AnalysisConfig,

    /// Output settings for the analyze command.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for analysis output files.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for metrics and chart files.
    pub directory: Option<PathBuf>,

    /// Chart width in pixels.
    pub plot_width: Option<u32>,

    /// Chart height in pixels.
    pub plot_height: Option<u32>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

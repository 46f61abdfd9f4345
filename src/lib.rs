//! # cpapflow - Respiratory Metrics from CPAP Venturi Captures
//!
//! `cpapflow` turns raw differential-pressure samples recorded by a
//! dual-venturi CPAP mask sensor into clinically meaningful metrics: flow rate
//! over time, breath count and rate, apnea events and mask leakage.
//!
//! ## Pipeline
//!
//! ```text
//! capture lines ─► parser ─► pressure (x3) ─► flow ─► session (time, flow)
//!                                                          │
//!                                  ┌───────────────────────┤
//!                                  ▼                       ▼
//!                            breath detector ──► leakage estimator
//!                                  │                       │
//!                                  └──────► analysis ◄─────┘
//!                                       (metrics + chart)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cpapflow::analysis::{Analyzer, SvgPlotProducer};
//! use cpapflow::config::AnalysisConfig;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default())?;
//! let reader = BufReader::new(File::open("patient_08.txt")?);
//! let analysis = analyzer.analyze_reader(reader, &SvgPlotProducer::new("flow.svg"))?;
//!
//! println!("{}", serde_json::to_string(&analysis.metrics)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Capture Format
//!
//! One sample per line, seven comma-separated fields: time in seconds
//! followed by six raw ADC codes (patient-side `p2`, `p1,ins`, `p1,exp`, then
//! the same three for the device side). See [`parser`].
//!
//! ## Metrics Record
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | duration | float | Last minus first sample time (s) |
//! | breaths | int | Number of detected breaths |
//! | breath_rate_bpm | float | Breaths per minute |
//! | breath_times | [float] | Time of each breath (s) |
//! | apnea_count | int | Gaps of 10 s or more between breaths |
//! | leakage | float or null | Net integrated flow (L); null if it could not be computed |
//!
//! ## Diagnostics
//!
//! The library reports through the [`log`] facade and never installs a
//! logger itself: rejected lines at `error`, negative or missing leakage at
//! `warn`, run start and completion at `info`.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod analysis;
pub mod breath;
pub mod config;
pub mod flow;
pub mod leakage;
pub mod numeric;
pub mod parser;
pub mod pressure;
pub mod session;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::analysis::{
        Analysis, AnalysisError, AnalysisSummary, Analyzer, ChartHandle, PlotError, PlotProducer,
        SvgPlotProducer,
    };
    pub use crate::breath::{detect_breaths, BreathConfig, BreathError, Metrics, PeakCriteria};
    pub use crate::config::{AnalysisConfig, ConfigError, ReportConfig};
    pub use crate::flow::{determine_upstream, volumetric_flow, FlowDirection, VenturiGeometry};
    pub use crate::leakage::{estimate_leakage, LeakageError};
    pub use crate::parser::{parse_line, ParseError, RawSample};
    pub use crate::pressure::{adc_to_pressure, Calibration};
    pub use crate::session::{Session, SessionPipeline};
}

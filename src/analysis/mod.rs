//! # Result Assembler
//!
//! Runs breath detection and leakage estimation over a [`Session`], in that
//! order, and packages the outcome together with a chart of flow rate
//! against time.
//!
//! ```rust,no_run
//! use cpapflow::analysis::{Analyzer, SvgPlotProducer};
//! use cpapflow::config::AnalysisConfig;
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default())?;
//! let capture = std::fs::read_to_string("patient_08.txt")?;
//! let session = analyzer.pipeline().run(capture.lines());
//!
//! let plotter = SvgPlotProducer::new("flow_rate_vs_time_plot.svg");
//! let analysis = analyzer.assemble(&session, &plotter)?;
//! println!(
//!     "{} bpm, {} apnea events",
//!     analysis.summary.breath_rate_bpm, analysis.summary.apnea_count
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod plot;


use std::io::BufRead;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::breath::{detect_breaths, Metrics};
use crate::config::AnalysisConfig;
use crate::leakage::estimate_leakage;
use crate::session::{Session, SessionPipeline};

pub use error::AnalysisError;
pub use plot::{ChartHandle, PlotError, PlotProducer, SvgPlotProducer};

/// Summary record handed to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Average breathing rate (breaths/min)
    pub breath_rate_bpm: f64,

    /// Number of apnea events
    pub apnea_count: usize,
}

impl AnalysisSummary {
    /// Whether the apnea count reaches the alert threshold
    pub fn needs_attention(&self, apnea_alert_count: usize) -> bool {
        self.apnea_count >= apnea_alert_count
    }
}

impl From<&Metrics> for AnalysisSummary {
    fn from(metrics: &Metrics) -> Self {
        Self {
            breath_rate_bpm: metrics.breath_rate_bpm,
            apnea_count: metrics.apnea_count,
        }
    }
}

/// Complete outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Full metrics record; `leakage` is `None` if it could not be estimated
    pub metrics: Metrics,

    /// Summary for downstream consumers
    pub summary: AnalysisSummary,

    /// Reference to the rendered flow-rate chart
    pub chart: ChartHandle,

    /// Number of capture lines rejected as malformed
    pub rejected_lines: usize,

    /// Whether the leakage estimate came out negative
    pub negative_leakage: bool,
}

/// Runs the full analysis with one configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer, validating the configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The analyzer's configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Session pipeline using this analyzer's calibration and geometry
    pub fn pipeline(&self) -> SessionPipeline {
        SessionPipeline::new(self.config.calibration, self.config.venturi)
    }

    /// Detect breaths, estimate leakage and render the chart for `session`.
    ///
    /// Fails if the session is empty or breath detection fails. A failed
    /// leakage estimate is logged and reported as `metrics.leakage == None`.
    pub fn assemble<P>(&self, session: &Session, plotter: &P) -> Result<Analysis, AnalysisError>
    where
        P: PlotProducer + ?Sized,
    {
        if session.is_empty() {
            return Err(AnalysisError::InsufficientData {
                rejected: session.rejected_lines(),
            });
        }

        let time = session.time();
        let flow = session.flow();

        let mut metrics = detect_breaths(time, flow, &self.config.breath)?.metrics;

        let negative_leakage = match estimate_leakage(time, flow, &mut metrics) {
            Ok(leakage) if leakage < 0.0 => {
                warn!("Leakage is negative ({} L): net outflow exceeds inflow", leakage);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Leakage could not be estimated: {}", e);
                false
            }
        };

        let summary = AnalysisSummary::from(&metrics);
        let chart = plotter.render(time, flow)?;

        info!(
            "Analysis complete: {} breaths, {} bpm, {} apnea events",
            metrics.breaths, metrics.breath_rate_bpm, metrics.apnea_count
        );

        Ok(Analysis {
            metrics,
            summary,
            chart,
            rejected_lines: session.rejected_lines(),
            negative_leakage,
        })
    }

    /// Parse `lines` and assemble the analysis.
    pub fn analyze_lines<I, S, P>(&self, lines: I, plotter: &P) -> Result<Analysis, AnalysisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: PlotProducer + ?Sized,
    {
        let session = self.pipeline().run(lines);
        self.assemble(&session, plotter)
    }

    /// Read a capture from `reader` and assemble the analysis.
    pub fn analyze_reader<R, P>(&self, reader: R, plotter: &P) -> Result<Analysis, AnalysisError>
    where
        R: BufRead,
        P: PlotProducer + ?Sized,
    {
        let session = self.pipeline().run_reader(reader)?;
        self.assemble(&session, plotter)
    }
}

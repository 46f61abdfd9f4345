//! Chart rendering of the flow-rate series.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while rendering a chart
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// I/O error writing the chart
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Formatting error while building the chart
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Nothing to draw
    #[error("no samples to plot")]
    EmptySeries,
}

/// Opaque reference to a rendered chart (file path, blob key, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartHandle(String);

impl ChartHandle {
    /// Wrap an artifact reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The artifact reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Path> for ChartHandle {
    fn from(path: &Path) -> Self {
        Self(path.display().to_string())
    }
}

/// Capability that renders flow rate against time.
pub trait PlotProducer {
    /// Render the series and return a handle to the artifact.
    fn render(&self, time: &[f64], flow: &[Option<f64>]) -> Result<ChartHandle, PlotError>;
}

/// Renders "Flow Rate vs Time" as an SVG line chart.
#[derive(Debug, Clone)]
pub struct SvgPlotProducer {
    path: PathBuf,
    width: u32,
    height: u32,
}

const MARGIN: f64 = 60.0;

impl SvgPlotProducer {
    /// Write charts to `path` at the default 800x480 size
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 800,
            height: 480,
        }
    }

    /// Override the chart size in pixels
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(2 * MARGIN as u32 + 1);
        self.height = height.max(2 * MARGIN as u32 + 1);
        self
    }

    /// Output path of the chart
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the chart as SVG text.
    ///
    /// Absent or non-finite flow values break the line into segments. A
    /// series without any finite flow value still yields the frame and
    /// labels; only an empty series is an error.
    pub fn to_svg(&self, time: &[f64], flow: &[Option<f64>]) -> Result<String, PlotError> {
        if time.is_empty() || flow.is_empty() {
            return Err(PlotError::EmptySeries);
        }

        let points: Vec<Option<(f64, f64)>> = time
            .iter()
            .zip(flow)
            .map(|(&t, q)| q.filter(|v| v.is_finite() && t.is_finite()).map(|v| (t, v)))
            .collect();

        let (mut t_min, mut t_max, mut q_min, mut q_max) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &(t, q) in points.iter().flatten() {
            t_min = t_min.min(t);
            t_max = t_max.max(t);
            q_min = q_min.min(q);
            q_max = q_max.max(q);
        }
        if !t_min.is_finite() {
            // No flow to draw: span the sample times and centre on zero
            for &t in time.iter().filter(|t| t.is_finite()) {
                t_min = t_min.min(t);
                t_max = t_max.max(t);
            }
            if !t_min.is_finite() {
                t_min = 0.0;
                t_max = 0.0;
            }
            q_min = 0.0;
            q_max = 0.0;
        }
        if t_max == t_min {
            t_max = t_min + 1.0;
        }
        if q_max == q_min {
            q_max += 0.5;
            q_min -= 0.5;
        }

        let w = self.width as f64;
        let h = self.height as f64;
        let plot_w = w - 2.0 * MARGIN;
        let plot_h = h - 2.0 * MARGIN;
        let sx = |t: f64| MARGIN + (t - t_min) / (t_max - t_min) * plot_w;
        let sy = |q: f64| h - MARGIN - (q - q_min) / (q_max - q_min) * plot_h;

        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">Flow Rate vs Time</text>"#,
            w / 2.0,
            MARGIN / 2.0
        )?;
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Time (s)</text>"#,
            w / 2.0,
            h - MARGIN / 4.0
        )?;
        writeln!(
            svg,
            r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="12" transform="rotate(-90 {x} {y})">Flow Rate (L/sec)</text>"#,
            x = MARGIN / 4.0,
            y = h / 2.0
        )?;
        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black"/>"#,
            MARGIN, MARGIN, plot_w, plot_h
        )?;
        if q_min < 0.0 && q_max > 0.0 {
            writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="gray" stroke-dasharray="4 4"/>"#,
                MARGIN,
                w - MARGIN,
                y = sy(0.0)
            )?;
        }
        for value in [t_min, t_max] {
            writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="10">{:.1}</text>"#,
                sx(value),
                h - MARGIN + 14.0,
                value
            )?;
        }
        for value in [q_min, q_max] {
            writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="10">{:.2}</text>"#,
                MARGIN - 4.0,
                sy(value) + 4.0,
                value
            )?;
        }

        for segment in points.split(|p| p.is_none()) {
            if segment.is_empty() {
                continue;
            }
            let coords: Vec<String> = segment
                .iter()
                .flatten()
                .map(|&(t, q)| format!("{:.2},{:.2}", sx(t), sy(q)))
                .collect();
            writeln!(
                svg,
                r#"<polyline fill="none" stroke="steelblue" stroke-width="1" points="{}"/>"#,
                coords.join(" ")
            )?;
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

impl PlotProducer for SvgPlotProducer {
    fn render(&self, time: &[f64], flow: &[Option<f64>]) -> Result<ChartHandle, PlotError> {
        let svg = self.to_svg(time, flow)?;
        fs::write(&self.path, svg)?;
        Ok(ChartHandle::from(self.path.as_path()))
    }
}

//! # Session Pipeline
//!
//! Drives the line parser, pressure converter and flow resolver over a whole
//! capture and collects the aligned time and flow-rate series.
//!
//! Malformed lines are counted and reported through the `log` facade but
//! never abort the run. A parsed line whose pressures have no physical flow
//! solution still contributes its time, with an absent flow value, so the two
//! series always have the same length.

#[cfg(test)]
mod tests;

use std::io::{BufRead, Write};

use log::{debug, error, info};
use serde::Serialize;

use crate::flow::VenturiGeometry;
use crate::parser::{parse_line, RawSample};
use crate::pressure::Calibration;

/// Aligned time and flow series produced from one capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    time: Vec<f64>,
    flow: Vec<Option<f64>>,
    rejected_lines: usize,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from already-resolved series.
    ///
    /// Returns `None` if the series lengths differ.
    pub fn from_series(time: Vec<f64>, flow: Vec<Option<f64>>) -> Option<Self> {
        if time.len() != flow.len() {
            return None;
        }
        Some(Self {
            time,
            flow,
            rejected_lines: 0,
        })
    }

    fn push(&mut self, time: f64, flow: Option<f64>) {
        self.time.push(time);
        self.flow.push(flow);
    }

    /// Sample times (s), in input order
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Flow rates (L/s); `None` where no flow could be resolved
    pub fn flow(&self) -> &[Option<f64>] {
        &self.flow
    }

    /// Flow rates with absent values mapped to NaN
    pub fn flow_or_nan(&self) -> Vec<f64> {
        self.flow.iter().map(|q| q.unwrap_or(f64::NAN)).collect()
    }

    /// Number of samples in the session
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the session holds no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of input lines rejected as malformed
    pub fn rejected_lines(&self) -> usize {
        self.rejected_lines
    }

    /// Number of samples whose flow could not be resolved
    pub fn absent_flows(&self) -> usize {
        self.flow.iter().filter(|q| q.is_none()).count()
    }

    /// Time between first and last sample (s), if any samples exist
    pub fn span(&self) -> Option<f64> {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }

    /// Write the series as CSV with a `time_s,flow_lps` header.
    ///
    /// Absent flow values are written as empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["time_s", "flow_lps"])?;
        for (t, q) in self.time.iter().zip(&self.flow) {
            let flow = q.map(|v| v.to_string()).unwrap_or_default();
            csv_writer.write_record([t.to_string(), flow])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Converts capture lines into a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionPipeline {
    calibration: Calibration,
    geometry: VenturiGeometry,
}

impl SessionPipeline {
    /// Create a pipeline with the given sensor calibration and venturi geometry
    pub fn new(calibration: Calibration, geometry: VenturiGeometry) -> Self {
        Self {
            calibration,
            geometry,
        }
    }

    /// Resolve the patient-side flow rate of one sample.
    pub fn resolve_flow(&self, sample: &RawSample) -> Option<f64> {
        let (p2, p_ins, p_exp) = sample.patient_codes();
        let p2 = self.calibration.code_to_pascals(p2)?;
        let p_ins = self.calibration.code_to_pascals(p_ins)?;
        let p_exp = self.calibration.code_to_pascals(p_exp)?;
        self.geometry.volumetric_flow(p2, p_ins, p_exp)
    }

    fn ingest(&self, session: &mut Session, line_number: usize, line: &str) {
        match parse_line(line) {
            Ok(sample) => {
                let flow = self.resolve_flow(&sample);
                if flow.is_none() {
                    debug!(
                        "Line {}: no flow solution for t={} s, recording absent value",
                        line_number, sample.time
                    );
                }
                session.push(sample.time, flow);
            }
            Err(e) => {
                session.rejected_lines += 1;
                error!("Incorrect/missing data on line {}, skipping entry: {}", line_number, e);
            }
        }
    }

    /// Process every line of a capture, in order.
    pub fn run<I, S>(&self, lines: I) -> Session
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        info!("Beginning data analysis...");
        let mut session = Session::new();
        for (index, line) in lines.into_iter().enumerate() {
            self.ingest(&mut session, index + 1, line.as_ref());
        }
        log_summary(&session);
        session
    }

    /// Process a capture read from `reader` until end of input.
    ///
    /// Lines that are not valid UTF-8 are rejected like any other malformed
    /// record; only I/O failures of the reader itself are returned as errors.
    pub fn run_reader<R: BufRead>(&self, reader: R) -> std::io::Result<Session> {
        info!("Beginning data analysis...");
        let mut session = Session::new();
        for (index, chunk) in reader.split(b'\n').enumerate() {
            let bytes = chunk?;
            let line = String::from_utf8_lossy(&bytes);
            self.ingest(&mut session, index + 1, &line);
        }
        log_summary(&session);
        Ok(session)
    }
}

fn log_summary(session: &Session) {
    info!(
        "Parsed {} samples ({} lines rejected, {} without flow)",
        session.len(),
        session.rejected_lines(),
        session.absent_flows()
    );
}

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use cpapflow::session::SessionPipeline;

use super::config::Config;
use super::ensure_exists;

/// Parse a capture and print how much of it is usable
pub fn run(file: PathBuf, config: Config) -> Result<()> {
    ensure_exists(&file)?;
    config
        .analysis
        .validate()
        .context("Invalid analysis configuration")?;

    let pipeline = SessionPipeline::new(config.analysis.calibration, config.analysis.venturi);
    let handle = File::open(&file).context("Failed to open file")?;
    let session = pipeline
        .run_reader(BufReader::new(handle))
        .context("Failed to read capture")?;

    println!("Capture Information");
    println!("===================");
    println!("File: {}", file.display());
    println!();
    println!("  Samples: {}", session.len());
    println!("  Rejected lines: {}", session.rejected_lines());
    println!("  Samples without flow: {}", session.absent_flows());
    match session.span() {
        Some(span) => println!("  Duration: {:.3} s", span),
        None => println!("  Duration: n/a (no valid samples)"),
    }
    if let (Some(first), Some(last)) = (session.time().first(), session.time().last()) {
        println!("  Time range: {} s .. {} s", first, last);
    }

    let finite: Vec<f64> = session.flow().iter().flatten().copied().collect();
    if let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) {
        println!("  Flow range: {:.3} .. {:.3} L/s", min, max);
    }

    Ok(())
}

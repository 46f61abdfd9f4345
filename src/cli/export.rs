use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use cpapflow::session::SessionPipeline;

use super::config::Config;
use super::ensure_exists;

/// Export the resolved flow-rate series of a capture as CSV
pub fn run(input: PathBuf, output: Option<PathBuf>, config: Config) -> Result<()> {
    ensure_exists(&input)?;
    config
        .analysis
        .validate()
        .context("Invalid analysis configuration")?;

    let output = output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_flow.csv", stem))
    });

    let pipeline = SessionPipeline::new(config.analysis.calibration, config.analysis.venturi);
    let handle = File::open(&input).context("Failed to open capture")?;
    let session = pipeline
        .run_reader(BufReader::new(handle))
        .context("Failed to read capture")?;

    let out = File::create(&output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    session
        .write_csv(BufWriter::new(out))
        .context("Failed to write CSV")?;

    info!(
        "Exported {} samples ({} lines rejected) to {}",
        session.len(),
        session.rejected_lines(),
        output.display()
    );
    println!("{}", output.display());
    Ok(())
}

//! # cpapflow
//!
//! Command-line front end for analyzing CPAP venturi captures.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a capture: writes patient_08.json and patient_08_flow_rate.svg
//! cpapflow -v analyze sample_data/patient_08.txt
//!
//! # Analyze several captures into one directory, with a config file
//! cpapflow analyze --config cpapflow.toml --output-dir results/ data/*.txt
//!
//! # Parse only and report how many lines were usable
//! cpapflow inspect sample_data/patient_08.txt
//!
//! # Export the resolved flow-rate series as CSV
//! cpapflow export sample_data/patient_08.txt flow.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity(), cli.log_file())?;
    cli::dispatch(cli)
}

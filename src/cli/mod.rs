use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};

mod analyze;
mod config;
mod export;
mod inspect;

use config::Config;

/// cpapflow - Respiratory metrics from CPAP venturi pressure captures
#[derive(Parser)]
#[command(name = "cpapflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze captures: metrics JSON, flow-rate chart and summary
    Analyze {
        /// Capture files to analyze
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for metrics and chart files (defaults to each input's directory)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Load analysis settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print a JSON report per capture instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Parse a capture and report record counts without running detection
    Inspect {
        /// Capture file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Load calibration and venturi settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Export the resolved time/flow-rate series as CSV
    Export {
        /// Capture file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV path (defaults to <INPUT stem>_flow.csv)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Load calibration and venturi settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Load the config file if one was given, defaults otherwise.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    Ok(())
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            inputs,
            output_dir,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            analyze::run(inputs, output_dir, config, json)
        }
        Commands::Inspect { file, config } => {
            let config = load_config(config.as_deref())?;
            inspect::run(file, config)
        }
        Commands::Export {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            export::run(input, output, config)
        }
    }
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cpapflow::analysis::{Analysis, Analyzer, SvgPlotProducer};

use super::config::{Config, OutputConfig};
use super::ensure_exists;

/// Per-capture report printed by `analyze --json`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    /// Capture file that was analyzed
    pub source_file: String,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,

    /// Where the metrics record was written
    pub metrics_file: String,

    /// Analysis outcome
    #[serde(flatten)]
    pub analysis: Analysis,
}

/// Analyze each capture and write its metrics and chart.
pub fn run(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    config: Config,
    json: bool,
) -> Result<()> {
    let analyzer = Analyzer::new(config.analysis).context("Invalid analysis configuration")?;
    let output_dir = output_dir.or_else(|| config.output.directory.clone());
    check_output_collisions(&inputs, output_dir.as_deref())?;
    if let Some(dir) = &output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    info!("cpapflow - CPAP capture analysis");
    info!("================================");
    info!("Captures: {}", inputs.len());

    let outcomes = analyze_all(&analyzer, &inputs, output_dir.as_deref(), &config.output);

    let alert_count = analyzer.config().report.apnea_alert_count;
    let mut failures = 0;
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(report) if json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(report) => print_summary(&report, alert_count),
            Err(e) => {
                failures += 1;
                error!("Analysis of {} failed: {:#}", input.display(), e);
                eprintln!("{}: {:#}", input.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} captures could not be analyzed", failures, inputs.len());
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn analyze_all(
    analyzer: &Analyzer,
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    output: &OutputConfig,
) -> Vec<Result<AnalysisReport>> {
    use rayon::prelude::*;

    inputs
        .par_iter()
        .map(|input| analyze_file(analyzer, input, output_dir, output))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn analyze_all(
    analyzer: &Analyzer,
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    output: &OutputConfig,
) -> Vec<Result<AnalysisReport>> {
    inputs
        .iter()
        .map(|input| analyze_file(analyzer, input, output_dir, output))
        .collect()
}

/// Metrics and chart paths for `input`: `<stem>.json` and
/// `<stem>_flow_rate.svg`, in `output_dir` or next to the input.
fn output_paths(input: &Path, output_dir: Option<&Path>) -> (PathBuf, PathBuf) {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.parent().map(Path::to_path_buf).unwrap_or_default());
    (
        dir.join(format!("{}.json", stem)),
        dir.join(format!("{}_flow_rate.svg", stem)),
    )
}

/// Refuse to run when two inputs would write the same output files.
fn check_output_collisions(inputs: &[PathBuf], output_dir: Option<&Path>) -> Result<()> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for input in inputs {
        let (metrics_path, _) = output_paths(input, output_dir);
        if let Some(previous) = claimed.insert(metrics_path.clone(), input.as_path()) {
            anyhow::bail!(
                "{} and {} would both write {}",
                previous.display(),
                input.display(),
                metrics_path.display()
            );
        }
    }
    Ok(())
}

/// Analyze one capture file.
fn analyze_file(
    analyzer: &Analyzer,
    input: &Path,
    output_dir: Option<&Path>,
    output: &OutputConfig,
) -> Result<AnalysisReport> {
    ensure_exists(input)?;

    let (metrics_path, plot_path) = output_paths(input, output_dir);

    info!("Input file: {}", input.display());

    let mut plotter = SvgPlotProducer::new(&plot_path);
    if output.plot_width.is_some() || output.plot_height.is_some() {
        plotter = plotter.with_size(
            output.plot_width.unwrap_or(800),
            output.plot_height.unwrap_or(480),
        );
    }

    let file = File::open(input)
        .with_context(|| format!("Failed to open capture: {}", input.display()))?;
    let analysis = analyzer
        .analyze_reader(BufReader::new(file), &plotter)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    let metrics_file = File::create(&metrics_path)
        .with_context(|| format!("Failed to create metrics file: {}", metrics_path.display()))?;
    serde_json::to_writer_pretty(metrics_file, &analysis.metrics)
        .context("Failed to write metrics JSON")?;

    info!(
        "Analysis complete. Metrics available in {}",
        metrics_path.display()
    );

    Ok(AnalysisReport {
        source_file: input.display().to_string(),
        analyzed_at: Utc::now(),
        metrics_file: metrics_path.display().to_string(),
        analysis,
    })
}

fn format_apnea_count(count: usize, alert: bool) -> String {
    #[cfg(feature = "colorized_output")]
    {
        if alert {
            return console::style(count).red().bold().to_string();
        }
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        if alert {
            return format!("{} (!)", count);
        }
    }
    count.to_string()
}

fn print_summary(report: &AnalysisReport, apnea_alert_count: usize) {
    let analysis = &report.analysis;
    let metrics = &analysis.metrics;
    let alert = analysis.summary.needs_attention(apnea_alert_count);

    println!("{}", report.source_file);
    println!("  Duration: {:.3} s", metrics.duration);
    println!(
        "  Breaths: {} ({:.3} bpm)",
        metrics.breaths, metrics.breath_rate_bpm
    );
    println!(
        "  Apnea events: {}",
        format_apnea_count(metrics.apnea_count, alert)
    );
    match metrics.leakage {
        Some(leakage) if analysis.negative_leakage => {
            println!("  Leakage: {:.3} L (negative: net outflow)", leakage)
        }
        Some(leakage) => println!("  Leakage: {:.3} L", leakage),
        None => println!("  Leakage: not available"),
    }
    if analysis.rejected_lines > 0 {
        println!("  Rejected lines: {}", analysis.rejected_lines);
    }
    println!("  Chart: {}", analysis.chart);
    println!("  Metrics: {}", report.metrics_file);
}

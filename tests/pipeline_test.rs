//! End-to-end tests for cpapflow
//!
//! These tests run captures from disk through parsing, breath detection,
//! leakage estimation and chart rendering.

mod common;

use common::{breathing_capture, capture_line};
use cpapflow::analysis::{AnalysisError, Analyzer, SvgPlotProducer};
use cpapflow::breath::Metrics;
use cpapflow::config::AnalysisConfig;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use tempfile::tempdir;

fn write_capture(dir: &std::path::Path, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// A 20 s capture with two clean breaths and no leak
#[test]
fn test_twenty_second_capture() {
    let dir = tempdir().unwrap();
    let capture = write_capture(dir.path(), "patient_01.txt", &breathing_capture(2, 800, 400, 52.0));
    let chart = dir.path().join("patient_01.svg");

    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let reader = BufReader::new(File::open(&capture).unwrap());
    let analysis = analyzer
        .analyze_reader(reader, &SvgPlotProducer::new(&chart))
        .unwrap();

    assert_eq!(analysis.metrics.breaths, 2);
    assert_eq!(analysis.metrics.apnea_count, 0);
    assert_eq!(analysis.metrics.duration, 20.0);
    assert!(analysis.metrics.leakage.unwrap().abs() <= 0.01);
    assert_eq!(analysis.summary.breath_rate_bpm, 6.0);

    assert_eq!(analysis.chart.as_str(), chart.display().to_string());
    let svg = fs::read_to_string(&chart).unwrap();
    assert!(svg.contains("Flow Rate vs Time"));
}

/// Corrupt lines are skipped and counted, the rest still produces metrics
#[test]
fn test_partially_corrupt_capture() {
    let dir = tempdir().unwrap();
    let mut lines = breathing_capture(2, 800, 400, 52.0);
    lines[100] = "0.99,1638,16".to_string();
    lines[900] = "9.00,1638,abc,1638,1638,1638,1638".to_string();
    lines.push(String::new());
    let capture = write_capture(dir.path(), "patient_02.txt", &lines);

    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let reader = BufReader::new(File::open(&capture).unwrap());
    let analysis = analyzer
        .analyze_reader(reader, &SvgPlotProducer::new(dir.path().join("chart.svg")))
        .unwrap();

    assert_eq!(analysis.rejected_lines, 3);
    assert_eq!(analysis.metrics.breaths, 2);
}

/// A capture without a single valid line reports insufficient data
#[test]
fn test_capture_without_valid_lines() {
    let dir = tempdir().unwrap();
    let lines = vec!["time,p2,p1ins,p1exp".to_string(), "garbage".to_string()];
    let capture = write_capture(dir.path(), "patient_03.txt", &lines);
    let chart = dir.path().join("chart.svg");

    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let reader = BufReader::new(File::open(&capture).unwrap());
    let result = analyzer.analyze_reader(reader, &SvgPlotProducer::new(&chart));

    match result {
        Err(AnalysisError::InsufficientData { rejected }) => assert_eq!(rejected, 2),
        other => panic!("expected insufficient data, got {:?}", other),
    }
    assert!(!chart.exists());
}

/// A capture with no resolvable flow still yields metrics and a chart
#[test]
fn test_capture_without_resolvable_flow() {
    let dir = tempdir().unwrap();
    let lines: Vec<String> = (0..=200)
        .map(|k| format!("{},1700,1650,1640,0,0,0", k as f64 / 100.0))
        .collect();
    let capture = write_capture(dir.path(), "patient_04.txt", &lines);
    let chart = dir.path().join("patient_04.svg");

    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let reader = BufReader::new(File::open(&capture).unwrap());
    let analysis = analyzer
        .analyze_reader(reader, &SvgPlotProducer::new(&chart))
        .unwrap();

    assert_eq!(analysis.rejected_lines, 0);
    assert_eq!(analysis.metrics.breaths, 0);
    assert_eq!(analysis.metrics.breath_rate_bpm, 0.0);
    assert_eq!(analysis.metrics.leakage, None);

    let svg = fs::read_to_string(&chart).unwrap();
    assert!(svg.contains("Flow Rate vs Time"));
    assert!(!svg.contains("<polyline"));
}

/// Trailing samples without a flow solution do not hide the leakage
#[test]
fn test_trailing_unresolvable_samples() {
    let mut lines = breathing_capture(2, 800, 400, 52.0);
    for k in 1..=50 {
        // Constriction above both taps: no flow solution
        lines.push(format!("{},1700,1650,1640,0,0,0", 20.0 + k as f64 / 100.0));
    }

    let dir = tempdir().unwrap();
    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let analysis = analyzer
        .analyze_lines(&lines, &SvgPlotProducer::new(dir.path().join("chart.svg")))
        .unwrap();

    assert_eq!(analysis.metrics.breaths, 2);
    assert_eq!(analysis.metrics.duration, 20.5);
    assert!(analysis.metrics.leakage.unwrap().abs() <= 0.01);
}

/// A capture drifting into net outflow still reports, with the warning flag set
#[test]
fn test_net_outflow_capture() {
    let mut lines = breathing_capture(2, 800, 0, 52.0);
    for k in 1..=400 {
        lines.push(capture_line(16.0 + k as f64 / 100.0, -20));
    }

    let dir = tempdir().unwrap();
    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let analysis = analyzer
        .analyze_lines(&lines, &SvgPlotProducer::new(dir.path().join("chart.svg")))
        .unwrap();

    assert!(analysis.negative_leakage);
    assert!(analysis.metrics.leakage.unwrap() < 0.0);
    assert_eq!(analysis.metrics.breaths, 2);
}

/// Running twice on the same input yields identical metrics
#[test]
fn test_repeat_runs_are_identical() {
    let lines = breathing_capture(4, 700, 300, 45.0);
    let dir = tempdir().unwrap();
    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let plotter = SvgPlotProducer::new(dir.path().join("chart.svg"));

    let first: Metrics = analyzer.analyze_lines(&lines, &plotter).unwrap().metrics;
    let second: Metrics = analyzer.analyze_lines(&lines, &plotter).unwrap().metrics;

    assert_eq!(first, second);
    for (a, b) in first.breath_times.iter().zip(&second.breath_times) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(
        first.leakage.map(f64::to_bits),
        second.leakage.map(f64::to_bits)
    );
}

/// Metrics round-trip through the JSON record format
#[test]
fn test_metrics_json_record() {
    let dir = tempdir().unwrap();
    let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();
    let analysis = analyzer
        .analyze_lines(
            &breathing_capture(2, 800, 400, 52.0),
            &SvgPlotProducer::new(dir.path().join("chart.svg")),
        )
        .unwrap();

    let json = serde_json::to_value(&analysis.metrics).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 6);
    for key in [
        "duration",
        "breaths",
        "breath_rate_bpm",
        "breath_times",
        "apnea_count",
        "leakage",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }

    let restored: Metrics = serde_json::from_value(json).unwrap();
    assert_eq!(restored, analysis.metrics);
}

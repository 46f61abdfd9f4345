use super::*;
use std::io::Cursor;

const CAPTURE: &str = "\
0.00,1638,1738,1638,1638,1638,1638
0.01,1700,1650,1800,1700,1650,1800
0.02,1638,1638,1638,1638,1638,1638
garbage line
0.03,1800,1700,1700,1638,1638,1638
0.04,1638,1738
";

#[test]
fn test_run_resolves_flows_in_order() {
    let session = SessionPipeline::default().run(CAPTURE.lines());

    assert_eq!(session.time(), &[0.0, 0.01, 0.02, 0.03]);
    assert_eq!(
        session.flow(),
        &[Some(0.829), Some(-0.829), Some(0.0), None]
    );
    assert_eq!(session.rejected_lines(), 2);
    assert_eq!(session.absent_flows(), 1);
    assert_eq!(session.len(), 4);
}

#[test]
fn test_run_reader_matches_run() {
    let pipeline = SessionPipeline::default();
    let from_lines = pipeline.run(CAPTURE.lines());
    let from_reader = pipeline.run_reader(Cursor::new(CAPTURE)).unwrap();
    assert_eq!(from_lines, from_reader);
}

#[test]
fn test_run_reader_rejects_invalid_utf8() {
    let mut bytes = b"0.00,1638,1738,1638,1638,1638,1638\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
    let session = SessionPipeline::default()
        .run_reader(Cursor::new(bytes))
        .unwrap();
    assert_eq!(session.len(), 1);
    assert_eq!(session.rejected_lines(), 1);
}

#[test]
fn test_run_empty_input() {
    let session = SessionPipeline::default().run(Vec::<String>::new());
    assert!(session.is_empty());
    assert_eq!(session.span(), None);
    assert_eq!(session.rejected_lines(), 0);
}

#[test]
fn test_all_lines_rejected() {
    let session = SessionPipeline::default().run(["a,b,c", "", "1,2"]);
    assert!(session.is_empty());
    assert_eq!(session.rejected_lines(), 3);
}

#[test]
fn test_series_always_aligned() {
    let session = SessionPipeline::default().run(CAPTURE.lines());
    assert_eq!(session.time().len(), session.flow().len());
    assert!(session.flow_or_nan()[3].is_nan());
}

#[test]
fn test_from_series_rejects_mismatch() {
    assert!(Session::from_series(vec![0.0, 1.0], vec![Some(0.0)]).is_none());
    let session = Session::from_series(vec![0.0, 2.5], vec![Some(0.1), None]).unwrap();
    assert_eq!(session.span(), Some(2.5));
}

#[test]
fn test_write_csv() {
    let session = Session::from_series(vec![0.0, 0.5], vec![Some(0.25), None]).unwrap();
    let mut buffer = Vec::new();
    session.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text, "time_s,flow_lps\n0,0.25\n0.5,\n");
}

use std::fs;

use health_core::Thresholds;
use health_report::analyze_file;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn sample_report_matches_golden() {
    let outcome = analyze_file(fixture_path("health_data.csv"), &Thresholds::default())
        .expect("sample file should analyse");

    let expected = fs::read_to_string(fixture_path("analysis_report.txt"))
        .expect("golden report should be readable");

    assert_eq!(outcome.report, expected);
    assert_eq!(outcome.summary.total_readings, 10);
}

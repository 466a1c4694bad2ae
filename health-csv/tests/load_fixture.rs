use health_core::{calculate_statistics, find_abnormal_readings, Thresholds};
use health_csv::load_data;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn sample_file_loads_every_row() {
    let dataset = load_data(fixture_path("health_data.csv")).expect("sample file should load");

    assert_eq!(dataset.len(), 10);
    assert_eq!(dataset.readings()[0].patient_id, "P001");
    assert_eq!(dataset.readings()[9].sensor_id, "SENSOR_D4");

    let span = dataset.time_span().expect("timestamps should parse");
    assert_eq!(span.first.to_string(), "2024-01-15 08:00:00");
    assert_eq!(span.last.to_string(), "2024-01-15 11:45:00");
}

#[test]
fn sample_file_reduces_to_expected_values() {
    let dataset = load_data(fixture_path("health_data.csv")).unwrap();

    let stats = calculate_statistics(&dataset).unwrap();
    assert_eq!(format!("{:.1}", stats.avg_heart_rate), "82.5");
    assert_eq!(format!("{:.1}", stats.avg_systolic_bp), "128.5");
    assert_eq!(format!("{:.1}", stats.avg_glucose), "109.6");

    let counts = find_abnormal_readings(&dataset, &Thresholds::default());
    assert_eq!(counts.high_heart_rate, 3);
    assert_eq!(counts.high_blood_pressure, 4);
    assert_eq!(counts.high_glucose, 4);
}

//! Text report rendering and persistence for analysed health data.

use std::path::Path;

use health_core::{AbnormalCounts, AnalysisSummary, HealthError, Statistics, Thresholds};

/// Input file read when no other path is given.
pub const DEFAULT_INPUT_PATH: &str = "health_data.csv";
/// Report destination used when no other path is given.
pub const DEFAULT_OUTPUT_PATH: &str = "output/analysis_report.txt";

const RULE: &str = "===========================";

/// Result of a full analysis: the derived values and the rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub summary: AnalysisSummary,
    pub report: String,
}

/// Render the fixed-layout report.
///
/// `total_readings` is printed as given; it is not checked against the counts.
/// Averages are shown with one decimal place.
pub fn generate_report(
    stats: &Statistics,
    abnormal: &AbnormalCounts,
    total_readings: usize,
) -> String {
    let Thresholds {
        heart_rate,
        systolic_bp,
        glucose,
    } = abnormal.thresholds;

    let lines = [
        RULE.to_string(),
        "Health Data Analysis Report".to_string(),
        RULE.to_string(),
        String::new(),
        "Dataset Statistics".to_string(),
        format!("   Total Readings: {total_readings}"),
        String::new(),
        "Average Values".to_string(),
        format!("   Average Heart Rate: {:.1} bpm", stats.avg_heart_rate),
        format!("   Average Systolic BP: {:.1} mmHg", stats.avg_systolic_bp),
        format!("   Average Glucose Level: {:.1} mg/dL", stats.avg_glucose),
        String::new(),
        "Abnormal Readings".to_string(),
        format!(
            "   High Heart Rate (>{heart_rate} bpm): {}",
            abnormal.high_heart_rate
        ),
        format!(
            "   High Systolic BP (>{systolic_bp} mmHg): {}",
            abnormal.high_blood_pressure
        ),
        format!(
            "   High Glucose Level (>{glucose} mg/dL): {}",
            abnormal.high_glucose
        ),
    ];

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Render the report for an [`AnalysisSummary`].
pub fn render_summary(summary: &AnalysisSummary) -> String {
    generate_report(&summary.statistics, &summary.abnormal, summary.total_readings)
}

/// Create or overwrite `path` with the report text.
///
/// Parent directories are not created; a missing directory is an error.
pub fn save_report(report: &str, path: impl AsRef<Path>) -> Result<(), HealthError> {
    let path = path.as_ref();
    std::fs::write(path, report).map_err(|source| HealthError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = report.len(), "report written");
    Ok(())
}

/// Load, reduce and render without touching the filesystem beyond the input.
pub fn analyze_file(
    input: impl AsRef<Path>,
    thresholds: &Thresholds,
) -> Result<AnalysisOutcome, HealthError> {
    let dataset = health_csv::load_data(input)?;
    let summary = AnalysisSummary::from_dataset(&dataset, thresholds)?;
    let report = render_summary(&summary);

    Ok(AnalysisOutcome { summary, report })
}

/// Full pipeline: analyse `input` and write the report to `output`.
///
/// Nothing is written unless every earlier step succeeded.
pub fn run_analysis(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    thresholds: &Thresholds,
) -> Result<AnalysisOutcome, HealthError> {
    let outcome = analyze_file(input, thresholds)?;
    save_report(&outcome.report, output)?;
    Ok(outcome)
}

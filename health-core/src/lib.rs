//! Core model for health sensor readings and the reductions computed over them.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum stored width (in characters) of a patient identifier.
pub const PATIENT_ID_WIDTH: usize = 10;
/// Maximum stored width (in characters) of a raw timestamp.
pub const TIMESTAMP_WIDTH: usize = 20;
/// Maximum stored width (in characters) of a sensor identifier.
pub const SENSOR_ID_WIDTH: usize = 10;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Clinical limits above which a reading counts as abnormal.
///
/// A value is abnormal only when it is strictly greater than its limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thresholds {
    /// Heart rate limit in bpm.
    pub heart_rate: i32,
    /// Systolic blood pressure limit in mmHg.
    pub systolic_bp: i32,
    /// Glucose level limit in mg/dL.
    pub glucose: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heart_rate: 90,
            systolic_bp: 130,
            glucose: 110,
        }
    }
}

/// One row of sensor data for one patient at one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub patient_id: String,
    /// Kept as text; see [`Reading::recorded_at`] for a parsed view.
    pub timestamp: String,
    pub heart_rate: i32,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub temperature: f32,
    pub glucose_level: i32,
    pub sensor_id: String,
}

impl Reading {
    /// Parse the raw timestamp, if it is in one of the recognised layouts.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

/// Ordered readings in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    readings: Vec<Reading>,
}

impl Dataset {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }

    /// Earliest and latest parseable timestamps. Rows whose timestamp does not
    /// parse are ignored; `None` when no row parses.
    pub fn time_span(&self) -> Option<TimeSpan> {
        let mut instants = self.readings.iter().filter_map(Reading::recorded_at);
        let first = instants.next()?;
        let (first, last) = instants.fold((first, first), |(lo, hi), at| (lo.min(at), hi.max(at)));
        Some(TimeSpan { first, last })
    }
}

impl FromIterator<Reading> for Dataset {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}

/// Range of recording times covered by a dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSpan {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// Column means, kept at full precision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub avg_heart_rate: f64,
    pub avg_systolic_bp: f64,
    pub avg_glucose: f64,
}

/// Number of readings above each threshold, together with the thresholds used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbnormalCounts {
    pub high_heart_rate: usize,
    pub high_blood_pressure: usize,
    pub high_glucose: usize,
    pub thresholds: Thresholds,
}

/// Everything derived from one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSummary {
    pub total_readings: usize,
    pub statistics: Statistics,
    pub abnormal: AbnormalCounts,
    #[serde(default)]
    pub time_span: Option<TimeSpan>,
}

impl AnalysisSummary {
    /// Reduce a dataset into statistics and abnormal counts.
    pub fn from_dataset(dataset: &Dataset, thresholds: &Thresholds) -> Result<Self, HealthError> {
        let statistics = calculate_statistics(dataset)?;
        let abnormal = find_abnormal_readings(dataset, thresholds);

        Ok(Self {
            total_readings: dataset.len(),
            statistics,
            abnormal,
            time_span: dataset.time_span(),
        })
    }
}

/// Arithmetic means of heart rate, systolic BP and glucose level.
///
/// Fails with [`HealthError::EmptyDataset`] when there is nothing to average.
pub fn calculate_statistics(dataset: &Dataset) -> Result<Statistics, HealthError> {
    if dataset.is_empty() {
        return Err(HealthError::EmptyDataset);
    }

    let statistics = Statistics {
        avg_heart_rate: column_mean(dataset, |r| r.heart_rate),
        avg_systolic_bp: column_mean(dataset, |r| r.systolic_bp),
        avg_glucose: column_mean(dataset, |r| r.glucose_level),
    };

    tracing::info!("Average Heart Rate: {}", statistics.avg_heart_rate);
    tracing::info!("Average Systolic BP: {}", statistics.avg_systolic_bp);
    tracing::info!("Average Glucose Level: {}", statistics.avg_glucose);

    Ok(statistics)
}

/// Count readings strictly above each threshold.
pub fn find_abnormal_readings(dataset: &Dataset, thresholds: &Thresholds) -> AbnormalCounts {
    let counts = AbnormalCounts {
        high_heart_rate: count_above(dataset, thresholds.heart_rate, |r| r.heart_rate),
        high_blood_pressure: count_above(dataset, thresholds.systolic_bp, |r| r.systolic_bp),
        high_glucose: count_above(dataset, thresholds.glucose, |r| r.glucose_level),
        thresholds: *thresholds,
    };

    tracing::info!("High HR count: {}", counts.high_heart_rate);
    tracing::info!("High BP count: {}", counts.high_blood_pressure);
    tracing::info!("High Glucose count: {}", counts.high_glucose);

    counts
}

fn count_above(dataset: &Dataset, limit: i32, value: impl Fn(&Reading) -> i32) -> usize {
    dataset.iter().map(value).filter(|&v| v > limit).count()
}

fn column_mean(dataset: &Dataset, value: impl Fn(&Reading) -> i32) -> f64 {
    let sum: i64 = dataset.iter().map(|reading| i64::from(value(reading))).sum();
    sum as f64 / dataset.len() as f64
}

/// Truncate `value` to at most `width` characters.
pub fn truncate_to_width(value: &str, width: usize) -> String {
    match value.char_indices().nth(width) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

/// Errors raised while loading, analysing or saving health data.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("input file {} does not exist", path.display())]
    InputMissing { path: PathBuf },
    #[error("cannot read input file {}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input has no header line")]
    EmptyInput,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: column `{column}` has value {value:?}, expected {expected}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("line {line}: malformed delimited text: {message}")]
    Csv { line: u64, message: String },
    #[error("dataset contains no readings")]
    EmptyDataset,
    #[error("cannot write report to {}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Delimited text loader producing a [`Dataset`] of sensor readings.
//!
//! The input has one header line followed by rows of exactly eight
//! comma-separated fields in fixed order:
//!
//! `patient_id, timestamp, heart_rate, blood_pressure_systolic,
//! blood_pressure_diastolic, temperature, glucose_level, sensor_id`
//!
//! The first line is always discarded, whatever it contains. In every later
//! line, text from the first `#` onward is a comment; lines left blank after
//! removing it are skipped. Fields are not quoted.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use health_core::{
    truncate_to_width, Dataset, HealthError, Reading, PATIENT_ID_WIDTH, SENSOR_ID_WIDTH,
    TIMESTAMP_WIDTH,
};

/// Column names in file order.
pub const COLUMNS: [&str; 8] = [
    "patient_id",
    "timestamp",
    "heart_rate",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "temperature",
    "glucose_level",
    "sensor_id",
];

/// Load every reading from the file at `path`.
pub fn load_data(path: impl AsRef<Path>) -> Result<Dataset, HealthError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => HealthError::InputMissing {
            path: path.to_path_buf(),
        },
        _ => HealthError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let dataset = read_readings(file)?;
    tracing::info!(path = %path.display(), readings = dataset.len(), "loaded health data");
    Ok(dataset)
}

/// Parse readings from any byte source. The first line is treated as a header.
pub fn read_readings<R: Read>(input: R) -> Result<Dataset, HealthError> {
    let mut input = BufReader::new(input);

    let mut header = String::new();
    let read = input.read_line(&mut header).map_err(|err| read_error(1, err))?;
    if read == 0 {
        return Err(HealthError::EmptyInput);
    }

    let header_len = header
        .trim_start_matches('#')
        .trim_end_matches(['\r', '\n'])
        .split(',')
        .count();
    if header_len != COLUMNS.len() {
        tracing::warn!(
            found = header_len,
            expected = COLUMNS.len(),
            "header field count differs from schema"
        );
    }

    // Rows that survive comment stripping, with their physical line numbers.
    let mut body = String::new();
    let mut lines = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx as u64 + 2;
        let raw = raw.map_err(|err| read_error(line, err))?;
        let content = strip_comment(&raw);
        if content.is_empty() {
            continue;
        }
        body.push_str(content);
        body.push('\n');
        lines.push(line);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(body.as_bytes());

    let mut dataset = Dataset::default();
    for (result, line) in reader.records().zip(lines) {
        let record = result.map_err(|err| HealthError::Csv {
            line,
            message: err.to_string(),
        })?;
        dataset.push(parse_record(&record, line)?);
    }

    tracing::debug!(readings = dataset.len(), "parsed delimited rows");
    Ok(dataset)
}

/// Drop everything from the first `#` and trim the remainder.
fn strip_comment(line: &str) -> &str {
    let content = line.split_once('#').map_or(line, |(before, _)| before);
    content.trim_matches([' ', '\t', '\r'])
}

fn read_error(line: u64, err: io::Error) -> HealthError {
    HealthError::Csv {
        line,
        message: err.to_string(),
    }
}

fn parse_record(record: &StringRecord, line: u64) -> Result<Reading, HealthError> {
    if record.len() != COLUMNS.len() {
        return Err(HealthError::FieldCount {
            line,
            expected: COLUMNS.len(),
            found: record.len(),
        });
    }

    Ok(Reading {
        patient_id: truncate_to_width(&record[0], PATIENT_ID_WIDTH),
        timestamp: truncate_to_width(&record[1], TIMESTAMP_WIDTH),
        heart_rate: parse_number(record, 2, line, "integer")?,
        systolic_bp: parse_number(record, 3, line, "integer")?,
        diastolic_bp: parse_number(record, 4, line, "integer")?,
        temperature: parse_number(record, 5, line, "float")?,
        glucose_level: parse_number(record, 6, line, "integer")?,
        sensor_id: truncate_to_width(&record[7], SENSOR_ID_WIDTH),
    })
}

fn parse_number<T: FromStr>(
    record: &StringRecord,
    index: usize,
    line: u64,
    expected: &'static str,
) -> Result<T, HealthError> {
    let raw = &record[index];
    raw.trim().parse().map_err(|_| HealthError::InvalidField {
        line,
        column: COLUMNS[index],
        value: raw.to_string(),
        expected,
    })
}

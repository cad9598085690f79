use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{NpsError, Result, ValidationError};
use crate::models::ResponseRow;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const NPS_COLUMN: &str = "nps";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

pub fn read_responses_from_path(csv_path: &Path) -> Result<Vec<ResponseRow>> {
    let file = std::fs::File::open(csv_path).map_err(|source| NpsError::Io {
        path: csv_path.to_path_buf(),
        source,
    })?;
    read_responses(file)
}

pub fn read_responses<R: Read>(input: R) -> Result<Vec<ResponseRow>> {
    // Short rows leave trailing cells absent rather than failing the file.
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(default)]
        timestamp: String,
        nps: Option<String>,
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    for required in [TIMESTAMP_COLUMN, NPS_COLUMN] {
        if !headers.iter().any(|name| name == required) {
            return Err(ValidationError::MissingColumn(required.to_string()).into());
        }
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let Some(timestamp) = parse_timestamp(&row.timestamp) else {
            // Header is line 1, so data row `index` sits on line index + 2.
            warn!(line = index + 2, value = %row.timestamp, "dropping row with unparseable timestamp");
            dropped += 1;
            continue;
        };

        rows.push(ResponseRow {
            timestamp,
            nps: row.nps.as_deref().and_then(parse_score),
        });
    }

    if rows.is_empty() && dropped > 0 {
        return Err(ValidationError::NoValidRows { dropped }.into());
    }

    debug!(kept = rows.len(), dropped, "parsed response rows");
    Ok(rows)
}

// Offsets are normalised to UTC before the zone is discarded.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn parse_score(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(score) = value.parse::<i64>() {
        return Some(score);
    }

    match value.parse::<f64>() {
        Ok(score) if score.is_finite() && score.fract() == 0.0 => Some(score as i64),
        _ => None,
    }
}

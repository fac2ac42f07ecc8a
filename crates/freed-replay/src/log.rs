//! ---
//! freed_section: "11-simulation-test-harness"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "CSV pose log loading."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Pose logs are CSV files with the header
//! `timestamp,frame,valid,x_pos,y_pos,z_pos,pan,tilt,roll,zoom,focus` and an
//! optional `camera_id` column. Zoom and focus hold raw lens counts.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use freed_proto::Pose;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReplayError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const U24_MAX: f64 = 16_777_215.0;

/// Raw row representation when deserializing logs.
#[derive(Debug, Deserialize)]
struct LogRow {
    timestamp: String,
    frame: u64,
    #[serde(deserialize_with = "lenient_bool")]
    valid: bool,
    x_pos: f64,
    y_pos: f64,
    z_pos: f64,
    pan: f64,
    tilt: f64,
    roll: f64,
    zoom: f64,
    focus: f64,
    #[serde(default)]
    camera_id: Option<u8>,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found '{other}'"
        ))),
    }
}

/// Parse RFC 3339 or `YYYY-mm-dd HH:MM:SS[.f]` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn lens_count(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, U24_MAX) as u32
}

/// One logged packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseRecord {
    pub timestamp: DateTime<Utc>,
    pub frame: u64,
    pub valid: bool,
    pub pose: Pose,
}

impl TryFrom<LogRow> for PoseRecord {
    type Error = String;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let timestamp = parse_timestamp(&row.timestamp)
            .ok_or_else(|| format!("unrecognised timestamp '{}'", row.timestamp))?;
        let pose = Pose::new(row.camera_id.unwrap_or(1))
            .with_position(row.x_pos, row.y_pos, row.z_pos)
            .with_orientation(row.pan, row.tilt, row.roll)
            .with_lens(lens_count(row.zoom), lens_count(row.focus));
        Ok(Self {
            timestamp,
            frame: row.frame,
            valid: row.valid,
            pose,
        })
    }
}

/// An in-memory pose log, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseLog {
    records: Vec<PoseRecord>,
}

impl PoseLog {
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let file = fs::File::open(path).map_err(|source| ReplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ReplayError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers().map_err(ReplayError::Header)?.clone();
        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|err| ReplayError::Row {
                line: err.position().map(|pos| pos.line()).unwrap_or_default(),
                message: err.to_string(),
            })?;
            let line = row.position().map(|pos| pos.line()).unwrap_or_default();
            let raw: LogRow = row
                .deserialize(Some(&headers))
                .map_err(|err| ReplayError::Row {
                    line,
                    message: err.to_string(),
                })?;
            let record = PoseRecord::try_from(raw)
                .map_err(|message| ReplayError::Row { line, message })?;
            records.push(record);
        }
        if records.is_empty() {
            return Err(ReplayError::Empty);
        }
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<PoseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PoseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn valid_records(&self) -> impl Iterator<Item = &PoseRecord> {
        self.records.iter().filter(|record| record.valid)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(|record| record.timestamp)
    }

    /// Offset of `record` from the first record; earlier timestamps clamp to zero.
    pub fn offset_of(&self, record: &PoseRecord) -> Duration {
        self.first_timestamp()
            .and_then(|first| (record.timestamp - first).to_std().ok())
            .unwrap_or_default()
    }

    /// Span between the earliest and latest timestamps.
    pub fn duration(&self) -> Duration {
        let earliest = self.records.iter().map(|record| record.timestamp).min();
        let latest = self.records.iter().map(|record| record.timestamp).max();
        match (earliest, latest) {
            (Some(earliest), Some(latest)) => (latest - earliest).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }
}

//! ---
//! freed_section: "11-simulation-test-harness"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Statistical analysis of pose logs."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;
use std::time::Duration;

use freed_common::time::achieved_rate;
use freed_common::{JitterHistogram, JitterSummary};
use serde::Serialize;

use crate::log::PoseLog;

/// Closed interval observed for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    fn starting_at(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} to {:.2}", self.min, self.max)
    }
}

/// Position and rotation extents over the valid records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseRanges {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
    pub pan: AxisRange,
    pub tilt: AxisRange,
    pub roll: AxisRange,
}

/// Summary statistics of a pose log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogAnalysis {
    pub duration: Duration,
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    pub average_rate_hz: f64,
    /// Spread of inter-packet intervals, in microseconds.
    pub intervals: Option<JitterSummary>,
    pub ranges: Option<PoseRanges>,
}

/// Compute duration, counts, packet rate, interval spread and pose ranges.
pub fn analyze(log: &PoseLog) -> LogAnalysis {
    let records = log.records();
    let total = records.len() as u64;
    let valid = log.valid_records().count() as u64;
    let duration = log.duration();

    let intervals = JitterHistogram::default();
    for pair in records.windows(2) {
        let gap = (pair[1].timestamp - pair[0].timestamp)
            .to_std()
            .unwrap_or_default();
        intervals.record(gap);
    }

    let mut ranges: Option<PoseRanges> = None;
    for record in log.valid_records() {
        let pose = &record.pose;
        match &mut ranges {
            Some(existing) => {
                existing.x.include(pose.x());
                existing.y.include(pose.y());
                existing.z.include(pose.z());
                existing.pan.include(pose.pan());
                existing.tilt.include(pose.tilt());
                existing.roll.include(pose.roll());
            }
            empty => {
                *empty = Some(PoseRanges {
                    x: AxisRange::starting_at(pose.x()),
                    y: AxisRange::starting_at(pose.y()),
                    z: AxisRange::starting_at(pose.z()),
                    pan: AxisRange::starting_at(pose.pan()),
                    tilt: AxisRange::starting_at(pose.tilt()),
                    roll: AxisRange::starting_at(pose.roll()),
                })
            }
        }
    }

    LogAnalysis {
        duration,
        total,
        valid,
        invalid: total - valid,
        average_rate_hz: achieved_rate(total, duration),
        intervals: intervals.summary(),
        ranges,
    }
}

impl fmt::Display for LogAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FreeD Packet Analysis ===")?;
        writeln!(f)?;
        writeln!(f, "Basic Statistics:")?;
        writeln!(f, "Total Duration: {:.2} seconds", self.duration.as_secs_f64())?;
        writeln!(f, "Total Packets: {}", self.total)?;
        writeln!(f, "Valid Packets: {}", self.valid)?;
        writeln!(f, "Invalid Packets: {}", self.invalid)?;
        write!(
            f,
            "Average Packet Rate: {:.2} packets/second",
            self.average_rate_hz
        )?;
        if let Some(intervals) = &self.intervals {
            writeln!(f)?;
            write!(
                f,
                "Packet Interval: mean {:.2} ms, jitter {:.2} ms, max {:.2} ms",
                intervals.mean_us / 1_000.0,
                intervals.std_dev_us / 1_000.0,
                intervals.max_us as f64 / 1_000.0
            )?;
        }
        if let Some(ranges) = &self.ranges {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "Position Range (mm):")?;
            writeln!(f, "X: {}", ranges.x)?;
            writeln!(f, "Y: {}", ranges.y)?;
            writeln!(f, "Z: {}", ranges.z)?;
            writeln!(f)?;
            writeln!(f, "Rotation Range (degrees):")?;
            writeln!(f, "Pan: {}", ranges.pan)?;
            writeln!(f, "Tilt: {}", ranges.tilt)?;
            write!(f, "Roll: {}", ranges.roll)?;
        }
        Ok(())
    }
}

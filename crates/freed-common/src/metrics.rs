//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Timing jitter statistics for paced loops."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::time::duration_to_micros;

/// Running lateness statistics of a paced loop.
///
/// Samples are folded into count, mean, M2, min and max as they arrive, so
/// a loop that never ends keeps constant-size state.
#[derive(Debug, Default)]
pub struct JitterHistogram {
    stats: Mutex<RunningStats>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: u64,
    max: u64,
}

impl RunningStats {
    fn push(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        let x = value as f64;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }
}

impl JitterHistogram {
    pub fn record(&self, jitter: Duration) {
        self.stats.lock().push(duration_to_micros(jitter));
    }

    /// Number of samples recorded so far.
    pub fn len(&self) -> u64 {
        self.stats.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> Option<JitterSummary> {
        let stats = *self.stats.lock();
        if stats.count == 0 {
            return None;
        }
        let variance = if stats.count > 1 {
            stats.m2 / (stats.count - 1) as f64
        } else {
            0.0
        };
        Some(JitterSummary {
            mean_us: stats.mean,
            std_dev_us: variance.max(0.0).sqrt(),
            max_us: stats.max,
            min_us: stats.min,
            samples: stats.count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterSummary {
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub max_us: u64,
    pub min_us: u64,
    pub samples: u64,
}

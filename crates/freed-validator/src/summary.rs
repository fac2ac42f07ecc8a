//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Per-outcome counters for a validation session."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;

use freed_proto::OutcomeKind;
use parking_lot::Mutex;
use serde::Serialize;

/// Snapshot of outcome counts for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub valid: u64,
    pub too_short: u64,
    pub bad_checksum: u64,
    pub bad_header: u64,
    pub out_of_range: u64,
    /// Socket receive failures; not counted in [`ValidationSummary::total`].
    pub recv_errors: u64,
}

impl ValidationSummary {
    pub fn count(&self, kind: OutcomeKind) -> u64 {
        match kind {
            OutcomeKind::Valid => self.valid,
            OutcomeKind::TooShort => self.too_short,
            OutcomeKind::BadChecksum => self.bad_checksum,
            OutcomeKind::BadHeader => self.bad_header,
            OutcomeKind::OutOfRangeField => self.out_of_range,
        }
    }

    pub fn total(&self) -> u64 {
        self.valid + self.invalid()
    }

    pub fn invalid(&self) -> u64 {
        self.too_short + self.bad_checksum + self.bad_header + self.out_of_range
    }

    /// Fraction of invalid buffers; zero for an empty session.
    pub fn invalid_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.invalid() as f64 / total as f64,
        }
    }

    /// Percentage of valid buffers; zero for an empty session.
    pub fn valid_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.valid as f64 * 100.0 / total as f64,
        }
    }

    fn bump(&mut self, kind: OutcomeKind) {
        let slot = match kind {
            OutcomeKind::Valid => &mut self.valid,
            OutcomeKind::TooShort => &mut self.too_short,
            OutcomeKind::BadChecksum => &mut self.bad_checksum,
            OutcomeKind::BadHeader => &mut self.bad_header,
            OutcomeKind::OutOfRangeField => &mut self.out_of_range,
        };
        *slot = slot.saturating_add(1);
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packets: {} valid ({:.1}%), {} invalid (too_short={}, bad_checksum={}, bad_header={}, out_of_range={})",
            self.total(),
            self.valid,
            self.valid_percent(),
            self.invalid(),
            self.too_short,
            self.bad_checksum,
            self.bad_header,
            self.out_of_range
        )?;
        if self.recv_errors > 0 {
            write!(f, ", {} receive errors", self.recv_errors)?;
        }
        Ok(())
    }
}

/// Shared, cloneable counter handle.
///
/// Every update and snapshot takes the same lock, so readers never observe a
/// partially applied increment.
#[derive(Debug, Default, Clone)]
pub struct SummaryCounter {
    inner: Arc<Mutex<ValidationSummary>>,
}

impl SummaryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: OutcomeKind) {
        self.inner.lock().bump(kind);
    }

    pub fn record_recv_error(&self) {
        let mut summary = self.inner.lock();
        summary.recv_errors = summary.recv_errors.saturating_add(1);
    }

    pub fn snapshot(&self) -> ValidationSummary {
        *self.inner.lock()
    }

    /// Zero every count. Only called at session start.
    pub fn reset(&self) {
        *self.inner.lock() = ValidationSummary::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_its_own_slot() {
        let counter = SummaryCounter::new();
        for (index, kind) in OutcomeKind::iter().enumerate() {
            for _ in 0..=index {
                counter.record(kind);
            }
        }
        let summary = counter.snapshot();
        for (index, kind) in OutcomeKind::iter().enumerate() {
            assert_eq!(summary.count(kind), index as u64 + 1, "{kind}");
        }
        assert_eq!(summary.total(), 15);
        assert_eq!(summary.invalid(), 14);
    }

    #[test]
    fn ratio_of_empty_session_is_zero() {
        let summary = ValidationSummary::default();
        assert_eq!(summary.invalid_ratio(), 0.0);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn clones_share_counts_and_reset_clears() {
        let counter = SummaryCounter::new();
        let clone = counter.clone();
        clone.record(OutcomeKind::Valid);
        clone.record(OutcomeKind::BadHeader);
        assert_eq!(counter.snapshot().total(), 2);
        assert_eq!(counter.snapshot().invalid_ratio(), 0.5);
        counter.reset();
        assert_eq!(clone.snapshot(), ValidationSummary::default());
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let counter = SummaryCounter::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.record(OutcomeKind::Valid);
                        counter.record(OutcomeKind::TooShort);
                        let snapshot = counter.snapshot();
                        assert!(snapshot.valid >= snapshot.too_short);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let summary = counter.snapshot();
        assert_eq!(summary.valid, 4_000);
        assert_eq!(summary.too_short, 4_000);
    }

    #[test]
    fn display_lists_every_counter() {
        let counter = SummaryCounter::new();
        counter.record(OutcomeKind::Valid);
        counter.record(OutcomeKind::OutOfRangeField);
        let text = counter.snapshot().to_string();
        assert_eq!(
            text,
            "2 packets: 1 valid (50.0%), 1 invalid (too_short=0, bad_checksum=0, bad_header=0, out_of_range=1)"
        );
    }

    #[test]
    fn receive_errors_are_listed_but_not_packets() {
        let counter = SummaryCounter::new();
        for _ in 0..3 {
            counter.record(OutcomeKind::Valid);
        }
        counter.record(OutcomeKind::BadChecksum);
        counter.record_recv_error();
        let summary = counter.snapshot();
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.recv_errors, 1);
        assert_eq!(summary.valid_percent(), 75.0);
        assert!(summary.to_string().ends_with("out_of_range=0), 1 receive errors"));
        assert_eq!(ValidationSummary::default().valid_percent(), 0.0);
    }

    #[test]
    fn summary_serializes_with_kind_names() {
        let counter = SummaryCounter::new();
        counter.record(OutcomeKind::Valid);
        counter.record(OutcomeKind::OutOfRangeField);
        let value = serde_json::to_value(counter.snapshot()).unwrap();
        assert_eq!(value["valid"], 1);
        assert_eq!(value["out_of_range"], 1);
        assert_eq!(value["too_short"], 0);
    }
}

//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Packet validator backed by the frame codec."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::SocketAddr;

use freed_proto::{decode, ValidationOutcome};

use crate::report::PacketReport;
use crate::summary::{SummaryCounter, ValidationSummary};

/// Classifies buffers and keeps a running tally of outcomes.
///
/// Cloning is cheap; clones share one [`SummaryCounter`].
#[derive(Debug, Default, Clone)]
pub struct PacketValidator {
    counter: SummaryCounter,
}

impl PacketValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validator that reports into an existing counter.
    pub fn with_counter(counter: SummaryCounter) -> Self {
        Self { counter }
    }

    /// Decode `bytes` and count the outcome exactly once.
    pub fn validate(&self, bytes: &[u8]) -> ValidationOutcome {
        let outcome = decode(bytes);
        self.counter.record(outcome.kind());
        outcome
    }

    /// Validate and wrap the result in a printable report.
    pub fn inspect(&self, source: SocketAddr, bytes: &[u8]) -> PacketReport {
        let outcome = self.validate(bytes);
        PacketReport::new(source, outcome, bytes)
    }

    pub fn summary(&self) -> ValidationSummary {
        self.counter.snapshot()
    }

    pub fn counter(&self) -> &SummaryCounter {
        &self.counter
    }

    pub fn reset(&self) {
        self.counter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freed_proto::{encode, OutcomeKind, Pose};

    #[test]
    fn counts_each_call_once() {
        let validator = PacketValidator::new();
        let frame = encode(&Pose::new(3).with_position(1.0, 2.0, 3.0));

        assert!(validator.validate(frame.as_ref()).is_valid());
        assert_eq!(
            validator.validate(&frame.as_ref()[..10]).kind(),
            OutcomeKind::TooShort
        );
        let mut corrupt = frame.into_bytes();
        corrupt[28] ^= 0x01;
        assert_eq!(validator.validate(&corrupt).kind(), OutcomeKind::BadChecksum);

        let summary = validator.summary();
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.too_short, 1);
        assert_eq!(summary.bad_checksum, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn clones_share_the_tally() {
        let validator = PacketValidator::new();
        let other = validator.clone();
        other.validate(&[]);
        assert_eq!(validator.summary().too_short, 1);
        validator.reset();
        assert_eq!(other.summary().total(), 0);
    }

    #[test]
    fn inspect_keeps_raw_bytes() {
        let validator = PacketValidator::new();
        let source: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let report = validator.inspect(source, &[0xAB, 0xCD]);
        assert_eq!(report.raw_hex(), "abcd");
        assert_eq!(report.source, source);
        assert_eq!(validator.summary().too_short, 1);
    }
}

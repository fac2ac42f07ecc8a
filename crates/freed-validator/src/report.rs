//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Human-readable per-packet reports."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;
use std::net::SocketAddr;

use freed_proto::{OutcomeKind, ValidationOutcome};

/// One received buffer together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketReport {
    pub source: SocketAddr,
    pub outcome: ValidationOutcome,
    pub raw: Vec<u8>,
}

impl PacketReport {
    pub fn new(source: SocketAddr, outcome: ValidationOutcome, raw: &[u8]) -> Self {
        Self {
            source,
            outcome,
            raw: raw.to_vec(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        self.outcome.kind()
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }

    pub fn raw_hex(&self) -> String {
        hex::encode(&self.raw)
    }
}

impl fmt::Display for PacketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ValidationOutcome::Valid(pose) => {
                write!(f, "Received packet from {}: valid {}", self.source, pose)
            }
            ValidationOutcome::Invalid(err) => write!(
                f,
                "Received packet from {}: invalid ({}) raw={}",
                self.source,
                err,
                self.raw_hex()
            ),
        }
    }
}

//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Built-in conformance cases for the packet validator."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Offline conformance suite.
//!
//! Each case is a hand-built buffer with the outcome a correct decoder must
//! produce. The suite runs through a fresh [`PacketValidator`], so it also
//! checks that every case is counted exactly once.

use std::fmt;

use freed_proto::{checksum, encode, OutcomeKind, Pose, ANGLE_SCALE, FRAME_LEN};
use serde::Serialize;

use crate::summary::ValidationSummary;
use crate::validator::PacketValidator;

const TILT_OFFSET: usize = 5;

/// A named input and the outcome it must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceCase {
    pub name: &'static str,
    pub bytes: Vec<u8>,
    pub expected: OutcomeKind,
}

impl ConformanceCase {
    pub fn new(name: &'static str, bytes: Vec<u8>, expected: OutcomeKind) -> Self {
        Self {
            name,
            bytes,
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    pub name: &'static str,
    pub expected: OutcomeKind,
    pub actual: OutcomeKind,
    /// Decoder message for invalid outcomes, or the pose for valid ones.
    pub detail: String,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub results: Vec<CaseResult>,
    pub summary: ValidationSummary,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let verdict = if result.passed() { "PASS" } else { "FAIL" };
            writeln!(
                f,
                "[{verdict}] {}: expected {}, got {} ({})",
                result.name, result.expected, result.actual, result.detail
            )?;
        }
        write!(
            f,
            "{} of {} cases passed",
            self.passed(),
            self.results.len()
        )
    }
}

fn reference_pose() -> Pose {
    Pose::new(1)
        .with_position(1000.0, -500.0, 2000.0)
        .with_orientation(45.0, -30.0, 0.0)
        .with_lens(32_768, 16_384)
}

fn reseal(bytes: &mut [u8]) {
    bytes[FRAME_LEN - 1] = checksum(&bytes[..FRAME_LEN - 1]);
}

/// The standard case list, in a fixed order.
pub fn standard_cases() -> Vec<ConformanceCase> {
    let standard = encode(&reference_pose()).into_bytes();

    let mut wrong_header = standard;
    wrong_header[0] = 0x44;
    reseal(&mut wrong_header);

    let mut wrong_checksum = standard;
    wrong_checksum[FRAME_LEN - 1] = wrong_checksum[FRAME_LEN - 1].wrapping_add(1);

    let extreme = Pose::new(255)
        .with_position(99_999.9, -99_999.9, 1.0e9)
        .with_orientation(540.5, -135.0, -181.0)
        .with_lens(u32::MAX, u32::MAX);

    let mut tilt_out_of_range = standard;
    let raw_tilt = (100.0 * ANGLE_SCALE) as i32;
    tilt_out_of_range[TILT_OFFSET..TILT_OFFSET + 3].copy_from_slice(&raw_tilt.to_be_bytes()[1..]);
    reseal(&mut tilt_out_of_range);

    let mut trailing = standard.to_vec();
    trailing.extend_from_slice(&[0xAA; 4]);

    vec![
        ConformanceCase::new("standard packet", standard.to_vec(), OutcomeKind::Valid),
        ConformanceCase::new("wrong header", wrong_header.to_vec(), OutcomeKind::BadHeader),
        ConformanceCase::new(
            "wrong checksum",
            wrong_checksum.to_vec(),
            OutcomeKind::BadChecksum,
        ),
        ConformanceCase::new(
            "truncated packet",
            standard[..20].to_vec(),
            OutcomeKind::TooShort,
        ),
        ConformanceCase::new("empty datagram", Vec::new(), OutcomeKind::TooShort),
        ConformanceCase::new(
            "extreme values clamp on encode",
            encode(&extreme).as_ref().to_vec(),
            OutcomeKind::Valid,
        ),
        ConformanceCase::new(
            "tilt beyond 90 degrees",
            tilt_out_of_range.to_vec(),
            OutcomeKind::OutOfRangeField,
        ),
        ConformanceCase::new(
            "zero pose",
            encode(&Pose::new(0)).as_ref().to_vec(),
            OutcomeKind::Valid,
        ),
        ConformanceCase::new("trailing bytes ignored", trailing, OutcomeKind::Valid),
    ]
}

/// Run `cases` through a fresh validator.
pub fn run_suite(cases: &[ConformanceCase]) -> SuiteReport {
    let validator = PacketValidator::new();
    let results = cases
        .iter()
        .map(|case| {
            let outcome = validator.validate(&case.bytes);
            let detail = match (outcome.pose(), outcome.error()) {
                (Some(pose), _) => pose.to_string(),
                (None, Some(err)) => err.to_string(),
                (None, None) => String::new(),
            };
            CaseResult {
                name: case.name,
                expected: case.expected,
                actual: outcome.kind(),
                detail,
            }
        })
        .collect();
    SuiteReport {
        results,
        summary: validator.summary(),
    }
}

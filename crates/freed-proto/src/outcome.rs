//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Decode errors and per-packet validation outcomes."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use thiserror::Error;

use crate::frame::FRAME_LEN;
use crate::pose::Pose;

/// Pose fields with a bounded legal domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PoseField {
    Pan,
    Tilt,
    Roll,
}

/// Why a buffer is not a well-formed D1 frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("too short: {len} of {} bytes", FRAME_LEN)]
    TooShort { len: usize },
    #[error("bad checksum: expected {expected:#04x}, found {found:#04x}")]
    BadChecksum { expected: u8, found: u8 },
    #[error("bad header: unrecognised message type {0:#04x}")]
    BadHeader(u8),
    #[error("{field} out of range: {value:.4} deg")]
    OutOfRangeField { field: PoseField, value: f64 },
}

impl DecodeError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DecodeError::TooShort { .. } => OutcomeKind::TooShort,
            DecodeError::BadChecksum { .. } => OutcomeKind::BadChecksum,
            DecodeError::BadHeader(_) => OutcomeKind::BadHeader,
            DecodeError::OutOfRangeField { .. } => OutcomeKind::OutOfRangeField,
        }
    }
}

/// Field-less discriminant of a [`ValidationOutcome`], used as a counter key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Valid,
    TooShort,
    BadChecksum,
    BadHeader,
    OutOfRangeField,
}

impl OutcomeKind {
    pub fn is_valid(&self) -> bool {
        matches!(self, OutcomeKind::Valid)
    }
}

/// Result of classifying one buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(Pose),
    Invalid(DecodeError),
}

impl ValidationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ValidationOutcome::Valid(_) => OutcomeKind::Valid,
            ValidationOutcome::Invalid(err) => err.kind(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn pose(&self) -> Option<&Pose> {
        match self {
            ValidationOutcome::Valid(pose) => Some(pose),
            ValidationOutcome::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            ValidationOutcome::Valid(_) => None,
            ValidationOutcome::Invalid(err) => Some(err),
        }
    }
}

impl From<Result<Pose, DecodeError>> for ValidationOutcome {
    fn from(result: Result<Pose, DecodeError>) -> Self {
        match result {
            Ok(pose) => ValidationOutcome::Valid(pose),
            Err(err) => ValidationOutcome::Invalid(err),
        }
    }
}

impl From<ValidationOutcome> for Result<Pose, DecodeError> {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid(pose) => Ok(pose),
            ValidationOutcome::Invalid(err) => Err(err),
        }
    }
}

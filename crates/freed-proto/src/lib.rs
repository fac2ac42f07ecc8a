//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "FreeD frame codec exports."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Codec for FreeD type D1 camera tracking messages.
//!
//! A D1 message is a fixed 29 byte big-endian frame carrying one camera pose
//! and a trailing checksum byte. [`encode`] never fails; out-of-domain values
//! are clamped before quantisation. [`decode`] classifies arbitrary input into
//! a [`ValidationOutcome`].

pub mod frame;
pub mod outcome;
pub mod pose;

pub use frame::{
    checksum, decode, encode, try_decode, Frame, ANGLE_SCALE, FRAME_LEN, MSG_TYPE_D1,
    POSITION_MAX_MM, POSITION_MIN_MM, POSITION_SCALE,
};
pub use outcome::{DecodeError, OutcomeKind, PoseField, ValidationOutcome};
pub use pose::Pose;

//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "FreeD D1 frame layout, checksum, encode and decode."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Fixed 29 byte FreeD type D1 message, big-endian:
//!
//! ```text
//! [0]      message type 0xD1
//! [1]      camera id
//! [2..5]   pan    i24, 1/32768 deg
//! [5..8]   tilt   i24, 1/32768 deg
//! [8..11]  roll   i24, 1/32768 deg
//! [11..14] x      i24, 1/64 mm
//! [14..17] y      i24, 1/64 mm
//! [17..20] z      i24, 1/64 mm
//! [20..23] zoom   u24 raw
//! [23..26] focus  u24 raw
//! [26..28] spare
//! [28]     checksum = 0x40 - sum([0..28]) mod 256
//! ```
use std::fmt;

use crate::outcome::{DecodeError, PoseField, ValidationOutcome};
use crate::pose::Pose;

/// Length of a D1 frame in bytes.
pub const FRAME_LEN: usize = 29;
/// Message type byte of a camera pose message.
pub const MSG_TYPE_D1: u8 = 0xD1;
/// Seed the checksum is subtracted from.
pub const CHECKSUM_SEED: u8 = 0x40;

/// Raw units per degree.
pub const ANGLE_SCALE: f64 = 32_768.0;
/// Raw units per millimetre.
pub const POSITION_SCALE: f64 = 64.0;

pub const PAN_LIMIT_DEG: f64 = 180.0;
pub const TILT_LIMIT_DEG: f64 = 90.0;
pub const ROLL_LIMIT_DEG: f64 = 180.0;

const I24_MIN: i32 = -(1 << 23);
const I24_MAX: i32 = (1 << 23) - 1;
const U24_MAX: u32 = (1 << 24) - 1;

/// Smallest and largest representable position in millimetres.
pub const POSITION_MIN_MM: f64 = I24_MIN as f64 / POSITION_SCALE;
pub const POSITION_MAX_MM: f64 = I24_MAX as f64 / POSITION_SCALE;

const OFF_CAMERA: usize = 1;
const OFF_PAN: usize = 2;
const OFF_TILT: usize = 5;
const OFF_ROLL: usize = 8;
const OFF_X: usize = 11;
const OFF_Y: usize = 14;
const OFF_Z: usize = 17;
const OFF_ZOOM: usize = 20;
const OFF_FOCUS: usize = 23;
const OFF_SPARE: usize = 26;
const OFF_CHECKSUM: usize = FRAME_LEN - 1;

/// One encoded D1 frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// Trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.0[OFF_CHECKSUM]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Frame> for [u8; FRAME_LEN] {
    fn from(frame: Frame) -> Self {
        frame.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame").field(&self.to_hex()).finish()
    }
}

/// Checksum over `bytes`: `0x40` minus the byte sum, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    CHECKSUM_SEED.wrapping_sub(sum)
}

/// Serialize a pose into a D1 frame.
///
/// Out-of-domain values are brought into range first: pan and roll wrap into
/// [-180, 180], tilt clamps to [-90, 90], positions clamp to the 24-bit range
/// and lens values saturate at 24 bits. Non-finite numbers encode as zero
/// (tilt and positions saturate on infinities).
pub fn encode(pose: &Pose) -> Frame {
    let raw = RawFields::from_pose(pose);
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = MSG_TYPE_D1;
    bytes[OFF_CAMERA] = pose.camera_id();
    write_i24(&mut bytes, OFF_PAN, raw.pan);
    write_i24(&mut bytes, OFF_TILT, raw.tilt);
    write_i24(&mut bytes, OFF_ROLL, raw.roll);
    write_i24(&mut bytes, OFF_X, raw.x);
    write_i24(&mut bytes, OFF_Y, raw.y);
    write_i24(&mut bytes, OFF_Z, raw.z);
    write_u24(&mut bytes, OFF_ZOOM, raw.zoom);
    write_u24(&mut bytes, OFF_FOCUS, raw.focus);
    bytes[OFF_SPARE..OFF_CHECKSUM].copy_from_slice(&pose.spare());
    bytes[OFF_CHECKSUM] = checksum(&bytes[..OFF_CHECKSUM]);
    Frame(bytes)
}

/// Classify an arbitrary buffer.
pub fn decode(bytes: &[u8]) -> ValidationOutcome {
    try_decode(bytes).into()
}

/// Decode a buffer, checking length, checksum, message type and field
/// domains in that order. Bytes beyond the first frame are ignored.
pub fn try_decode(bytes: &[u8]) -> Result<Pose, DecodeError> {
    if bytes.len() < FRAME_LEN {
        return Err(DecodeError::TooShort { len: bytes.len() });
    }
    let frame = &bytes[..FRAME_LEN];

    let expected = checksum(&frame[..OFF_CHECKSUM]);
    let found = frame[OFF_CHECKSUM];
    if expected != found {
        return Err(DecodeError::BadChecksum { expected, found });
    }

    if frame[0] != MSG_TYPE_D1 {
        return Err(DecodeError::BadHeader(frame[0]));
    }

    let pan = read_i24(frame, OFF_PAN) as f64 / ANGLE_SCALE;
    let tilt = read_i24(frame, OFF_TILT) as f64 / ANGLE_SCALE;
    let roll = read_i24(frame, OFF_ROLL) as f64 / ANGLE_SCALE;
    check_range(PoseField::Pan, pan, PAN_LIMIT_DEG)?;
    check_range(PoseField::Tilt, tilt, TILT_LIMIT_DEG)?;
    check_range(PoseField::Roll, roll, ROLL_LIMIT_DEG)?;

    let x = read_i24(frame, OFF_X) as f64 / POSITION_SCALE;
    let y = read_i24(frame, OFF_Y) as f64 / POSITION_SCALE;
    let z = read_i24(frame, OFF_Z) as f64 / POSITION_SCALE;

    Ok(Pose::new(frame[OFF_CAMERA])
        .with_orientation(pan, tilt, roll)
        .with_position(x, y, z)
        .with_lens(read_u24(frame, OFF_ZOOM), read_u24(frame, OFF_FOCUS))
        .with_spare([frame[OFF_SPARE], frame[OFF_SPARE + 1]]))
}

pub(crate) fn quantize(pose: &Pose) -> Pose {
    let raw = RawFields::from_pose(pose);
    Pose::new(pose.camera_id())
        .with_orientation(
            raw.pan as f64 / ANGLE_SCALE,
            raw.tilt as f64 / ANGLE_SCALE,
            raw.roll as f64 / ANGLE_SCALE,
        )
        .with_position(
            raw.x as f64 / POSITION_SCALE,
            raw.y as f64 / POSITION_SCALE,
            raw.z as f64 / POSITION_SCALE,
        )
        .with_lens(raw.zoom, raw.focus)
        .with_spare(pose.spare())
}

fn check_range(field: PoseField, value: f64, limit: f64) -> Result<(), DecodeError> {
    if value.abs() > limit {
        return Err(DecodeError::OutOfRangeField { field, value });
    }
    Ok(())
}

/// Integer wire values of a pose after clamping.
struct RawFields {
    pan: i32,
    tilt: i32,
    roll: i32,
    x: i32,
    y: i32,
    z: i32,
    zoom: u32,
    focus: u32,
}

impl RawFields {
    fn from_pose(pose: &Pose) -> Self {
        Self {
            pan: to_raw(wrap_degrees(pose.pan(), PAN_LIMIT_DEG), ANGLE_SCALE),
            tilt: to_raw(clamp_finite(pose.tilt(), TILT_LIMIT_DEG), ANGLE_SCALE),
            roll: to_raw(wrap_degrees(pose.roll(), ROLL_LIMIT_DEG), ANGLE_SCALE),
            x: to_raw(pose.x(), POSITION_SCALE),
            y: to_raw(pose.y(), POSITION_SCALE),
            z: to_raw(pose.z(), POSITION_SCALE),
            zoom: pose.zoom().min(U24_MAX),
            focus: pose.focus().min(U24_MAX),
        }
    }
}

/// Values already inside `[-limit, limit]` are kept as-is so quantized poses
/// stay fixed points of the codec.
fn wrap_degrees(value: f64, limit: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value.abs() <= limit {
        return value;
    }
    let span = 2.0 * limit;
    (value + limit).rem_euclid(span) - limit
}

fn clamp_finite(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-limit, limit)
}

fn to_raw(value: f64, scale: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    (value * scale)
        .round()
        .clamp(I24_MIN as f64, I24_MAX as f64) as i32
}

fn write_i24(buf: &mut [u8; FRAME_LEN], offset: usize, value: i32) {
    let bytes = value.to_be_bytes();
    buf[offset..offset + 3].copy_from_slice(&bytes[1..]);
}

fn write_u24(buf: &mut [u8; FRAME_LEN], offset: usize, value: u32) {
    let bytes = value.to_be_bytes();
    buf[offset..offset + 3].copy_from_slice(&bytes[1..]);
}

fn read_u24(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([0, buf[offset], buf[offset + 1], buf[offset + 2]])
}

fn read_i24(buf: &[u8], offset: usize) -> i32 {
    // sign-extend from bit 23
    (i32::from_be_bytes([buf[offset], buf[offset + 1], buf[offset + 2], 0])) >> 8
}

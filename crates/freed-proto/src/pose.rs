//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Camera pose value carried by a FreeD D1 frame."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Position and orientation of a tracked camera at one instant.
///
/// Angles are degrees, positions are millimetres. Zoom and focus are the raw
/// lens encoder counts transported by the frame; their scaling is vendor
/// specific so they are carried uninterpreted, as is the two byte spare block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    camera_id: u8,
    pan: f64,
    tilt: f64,
    roll: f64,
    x: f64,
    y: f64,
    z: f64,
    zoom: u32,
    focus: u32,
    spare: [u8; 2],
}

impl Pose {
    /// Create a pose at the origin, level, for the given camera.
    pub fn new(camera_id: u8) -> Self {
        Self {
            camera_id,
            ..Self::default()
        }
    }

    /// Return a copy with the position replaced (millimetres).
    pub fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Return a copy with the orientation replaced (degrees).
    pub fn with_orientation(mut self, pan: f64, tilt: f64, roll: f64) -> Self {
        self.pan = pan;
        self.tilt = tilt;
        self.roll = roll;
        self
    }

    /// Return a copy with the raw lens encoder values replaced.
    pub fn with_lens(mut self, zoom: u32, focus: u32) -> Self {
        self.zoom = zoom;
        self.focus = focus;
        self
    }

    /// Return a copy with the opaque spare bytes replaced.
    pub fn with_spare(mut self, spare: [u8; 2]) -> Self {
        self.spare = spare;
        self
    }

    /// Return a copy addressed to another camera.
    pub fn with_camera_id(mut self, camera_id: u8) -> Self {
        self.camera_id = camera_id;
        self
    }

    pub fn camera_id(&self) -> u8 {
        self.camera_id
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn focus(&self) -> u32 {
        self.focus
    }

    pub fn spare(&self) -> [u8; 2] {
        self.spare
    }

    /// Position as `[x, y, z]` in millimetres.
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Orientation as `[pan, tilt, roll]` in degrees.
    pub fn orientation(&self) -> [f64; 3] {
        [self.pan, self.tilt, self.roll]
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The pose exactly as it reads back after an encode/decode round trip.
    pub fn quantized(&self) -> Pose {
        crate::frame::quantize(self)
    }
}

/// Compact single-line rendering used by packet reports.
impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera={} pos=({:.2}, {:.2}, {:.2}) mm rot=({:.2}, {:.2}, {:.2}) deg zoom={} focus={}",
            self.camera_id,
            self.x,
            self.y,
            self.z,
            self.pan,
            self.tilt,
            self.roll,
            self.zoom,
            self.focus
        )
    }
}

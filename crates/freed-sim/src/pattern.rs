//! ---
//! freed_section: "11-simulation"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Parametric motion pattern specifications."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::f64::consts::TAU;
use std::str::FromStr;
use std::time::Duration;

use freed_proto::Pose;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::SimError;

pub const DEFAULT_RADIUS_MM: f64 = 1_000.0;
pub const DEFAULT_HEIGHT_MM: f64 = 2_000.0;
pub const DEFAULT_RATE_HZ: f64 = 30.0;
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(10);
pub const DEFAULT_ZOOM: u32 = 32_768;
pub const DEFAULT_FOCUS: u32 = 16_384;

/// Phase step used to estimate the direction of travel.
const TANGENT_EPSILON: f64 = 1.0e-6;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Circle,
    #[strum(serialize = "figure8")]
    #[serde(rename = "figure8")]
    Figure8,
    Oscillate,
}

impl FromStr for PatternKind {
    type Err = SimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "circle" => Ok(PatternKind::Circle),
            "figure8" => Ok(PatternKind::Figure8),
            "oscillate" => Ok(PatternKind::Oscillate),
            other => Err(SimError::UnknownPattern(other.to_string())),
        }
    }
}

/// The plane a pattern is traced in; the remaining axis is its normal.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    #[default]
    Xy,
    Xz,
    Yz,
}

impl Plane {
    /// Map in-plane coordinates `(u, v)` and normal offset `w` to `[x, y, z]`.
    fn place(self, u: f64, v: f64, w: f64) -> [f64; 3] {
        match self {
            Plane::Xy => [u, v, w],
            Plane::Xz => [u, w, v],
            Plane::Yz => [w, u, v],
        }
    }
}

/// How the simulated camera is pointed along the path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum OrientationMode {
    /// Face the direction of travel.
    #[default]
    Tangent,
    /// Look at the pattern center.
    Center,
    /// Hold a constant attitude, in degrees.
    Fixed { pan: f64, tilt: f64, roll: f64 },
}

impl OrientationMode {
    pub fn name(&self) -> &'static str {
        match self {
            OrientationMode::Tangent => "tangent",
            OrientationMode::Center => "center",
            OrientationMode::Fixed { .. } => "fixed",
        }
    }
}

impl FromStr for OrientationMode {
    type Err = SimError;

    /// Accepts `tangent`, `center` or `fixed:<pan>,<tilt>,<roll>`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tangent" => return Ok(OrientationMode::Tangent),
            "center" => return Ok(OrientationMode::Center),
            _ => {}
        }
        let invalid = || {
            SimError::InvalidSpec(format!(
                "orientation '{value}' is not tangent, center or fixed:<pan>,<tilt>,<roll>"
            ))
        };
        let angles = value.strip_prefix("fixed:").ok_or_else(invalid)?;
        let parsed = angles
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        match parsed.as_slice() {
            [pan, tilt, roll] => Ok(OrientationMode::Fixed {
                pan: *pan,
                tilt: *tilt,
                roll: *roll,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Immutable, validated description of one pattern pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternSpec {
    kind: PatternKind,
    radius: f64,
    center: [f64; 3],
    plane: Plane,
    revolutions: f64,
    orientation: OrientationMode,
    camera_id: u8,
    zoom: u32,
    focus: u32,
    duration: Duration,
    rate_hz: f64,
}

impl PatternSpec {
    pub fn builder(kind: PatternKind) -> PatternSpecBuilder {
        PatternSpecBuilder::new(kind)
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn revolutions(&self) -> f64 {
        self.revolutions
    }

    pub fn orientation(&self) -> OrientationMode {
        self.orientation
    }

    pub fn camera_id(&self) -> u8 {
        self.camera_id
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Number of samples in one pass: `round(duration * rate)`.
    pub fn sample_count(&self) -> u64 {
        (self.duration.as_secs_f64() * self.rate_hz).round() as u64
    }

    /// Phase of sample `index` within one pass.
    pub fn phase_of(&self, index: u64) -> f64 {
        TAU * self.revolutions * index as f64 / self.sample_count() as f64
    }

    /// Position in millimetres at `phase` radians.
    pub fn position_at(&self, phase: f64) -> [f64; 3] {
        let r = self.radius;
        let (u, v, w) = match self.kind {
            PatternKind::Circle => (r * phase.cos(), r * phase.sin(), 0.0),
            PatternKind::Figure8 => {
                let denom = 1.0 + phase.sin().powi(2);
                (
                    r * phase.cos() / denom,
                    r * phase.sin() * phase.cos() / denom,
                    0.0,
                )
            }
            PatternKind::Oscillate => (r * phase.sin(), 0.0, r * phase.cos() / 2.0),
        };
        let offset = self.plane.place(u, v, w);
        [
            self.center[0] + offset[0],
            self.center[1] + offset[1],
            self.center[2] + offset[2],
        ]
    }

    /// Full pose at `phase` radians.
    pub fn pose_at(&self, phase: f64) -> Pose {
        let [x, y, z] = self.position_at(phase);
        let (pan, tilt, roll) = match self.orientation {
            OrientationMode::Fixed { pan, tilt, roll } => (pan, tilt, roll),
            OrientationMode::Center => {
                let (pan, tilt) = heading([
                    self.center[0] - x,
                    self.center[1] - y,
                    self.center[2] - z,
                ]);
                (pan, tilt, 0.0)
            }
            OrientationMode::Tangent => {
                let ahead = self.position_at(phase + TANGENT_EPSILON);
                let behind = self.position_at(phase - TANGENT_EPSILON);
                let (pan, tilt) = heading([
                    ahead[0] - behind[0],
                    ahead[1] - behind[1],
                    ahead[2] - behind[2],
                ]);
                (pan, tilt, 0.0)
            }
        };
        Pose::new(self.camera_id)
            .with_position(x, y, z)
            .with_orientation(pan, tilt, roll)
            .with_lens(self.zoom, self.focus)
    }
}

/// Pan and tilt in degrees looking along `direction`; level when degenerate.
fn heading(direction: [f64; 3]) -> (f64, f64) {
    let [dx, dy, dz] = direction;
    let horizontal = dx.hypot(dy);
    if horizontal == 0.0 && dz == 0.0 {
        return (0.0, 0.0);
    }
    (dy.atan2(dx).to_degrees(), dz.atan2(horizontal).to_degrees())
}

/// Builder for [`PatternSpec`]; [`build`](PatternSpecBuilder::build) validates.
#[derive(Debug, Clone)]
pub struct PatternSpecBuilder {
    spec: PatternSpec,
}

impl PatternSpecBuilder {
    fn new(kind: PatternKind) -> Self {
        Self {
            spec: PatternSpec {
                kind,
                radius: DEFAULT_RADIUS_MM,
                center: [0.0, 0.0, DEFAULT_HEIGHT_MM],
                plane: Plane::default(),
                revolutions: 1.0,
                orientation: OrientationMode::default(),
                camera_id: 1,
                zoom: DEFAULT_ZOOM,
                focus: DEFAULT_FOCUS,
                duration: DEFAULT_PERIOD,
                rate_hz: DEFAULT_RATE_HZ,
            },
        }
    }

    /// Radius for circles, lobe size for figure-eights, amplitude for
    /// oscillation, in millimetres.
    pub fn radius(mut self, radius: f64) -> Self {
        self.spec.radius = radius;
        self
    }

    pub fn center(mut self, x: f64, y: f64, z: f64) -> Self {
        self.spec.center = [x, y, z];
        self
    }

    pub fn plane(mut self, plane: Plane) -> Self {
        self.spec.plane = plane;
        self
    }

    /// Revolutions completed over `duration`.
    pub fn revolutions(mut self, revolutions: f64) -> Self {
        self.spec.revolutions = revolutions;
        self
    }

    pub fn orientation(mut self, orientation: OrientationMode) -> Self {
        self.spec.orientation = orientation;
        self
    }

    pub fn camera_id(mut self, camera_id: u8) -> Self {
        self.spec.camera_id = camera_id;
        self
    }

    pub fn zoom(mut self, zoom: u32) -> Self {
        self.spec.zoom = zoom;
        self
    }

    pub fn focus(mut self, focus: u32) -> Self {
        self.spec.focus = focus;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.spec.duration = duration;
        self
    }

    pub fn rate_hz(mut self, rate_hz: f64) -> Self {
        self.spec.rate_hz = rate_hz;
        self
    }

    pub fn build(self) -> Result<PatternSpec, SimError> {
        let spec = self.spec;
        let invalid = |message: String| Err(SimError::InvalidSpec(message));
        if !(spec.rate_hz.is_finite() && spec.rate_hz > 0.0) {
            return invalid(format!("rate must be positive (got {} Hz)", spec.rate_hz));
        }
        if spec.duration.is_zero() {
            return invalid("duration must be greater than zero".into());
        }
        if !(spec.radius.is_finite() && spec.radius >= 0.0) {
            return invalid(format!("radius must be finite and non-negative (got {})", spec.radius));
        }
        if !spec.revolutions.is_finite() {
            return invalid(format!("revolutions must be finite (got {})", spec.revolutions));
        }
        if spec.center.iter().any(|value| !value.is_finite()) {
            return invalid("center must be finite".into());
        }
        if let OrientationMode::Fixed { pan, tilt, roll } = spec.orientation {
            if [pan, tilt, roll].iter().any(|value| !value.is_finite()) {
                return invalid("fixed orientation must be finite".into());
            }
        }
        if spec.sample_count() == 0 {
            return invalid(format!(
                "{:?} at {} Hz yields no samples",
                spec.duration, spec.rate_hz
            ));
        }
        Ok(spec)
    }
}

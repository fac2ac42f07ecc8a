//! ---
//! freed_section: "11-simulation"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Motion pattern generation and simulator exports."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Synthetic FreeD streams.
//!
//! A [`PatternSpec`] describes one pass of a parametric camera move, the
//! [`MotionGenerator`] turns it into timed [`PoseSample`]s, and the
//! [`Simulator`] paces those samples onto a UDP socket.

pub mod error;
pub mod generator;
pub mod pattern;
pub mod simulator;

pub use error::SimError;
pub use generator::{generate, MotionGenerator, PatternSamples, PoseSample};
pub use pattern::{OrientationMode, PatternKind, PatternSpec, PatternSpecBuilder, Plane};
pub use simulator::{SampleEvent, SimState, SimulationReport, Simulator};

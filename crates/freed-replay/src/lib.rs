//! ---
//! freed_section: "11-simulation-test-harness"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Pose log replay and analysis exports."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Replay utilities for recorded FreeD pose logs.
//!
//! Logs are read from CSV into a [`PoseLog`], re-sent over UDP by the
//! [`Replayer`] at their recorded pace, or summarised by [`analyze`].

pub mod analysis;
pub mod error;
pub mod log;
pub mod replay;

pub use analysis::{analyze, AxisRange, LogAnalysis, PoseRanges};
pub use error::ReplayError;
pub use log::{parse_timestamp, PoseLog, PoseRecord};
pub use replay::{ReplayExit, ReplaySummary, Replayer};

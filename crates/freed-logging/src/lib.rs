//! ---
//! freed_section: "03-persistence-logging"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Structured session logging helpers."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Session-scoped logging on top of `tracing`.
//!
//! Every event emitted through the `freed_*` macros or [`log_session_event`]
//! carries the same field set (`session`, `role`, `camera`, `sequence`) so
//! listener, simulator and replay logs can be filtered uniformly.

use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for tests and tools
/// that do not go through `freed_common::init_tracing`.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// The kind of session an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// Listening and validating incoming packets.
    Validator,
    /// Sending a synthetic motion pattern.
    Simulator,
    /// Replaying a recorded pose log.
    Replay,
    /// Running the offline conformance suite.
    Conformance,
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Free-form session label, typically the pattern or log file name.
    pub session: Option<&'a str>,
    /// Role of the emitting session.
    pub role: Option<SessionRole>,
    /// FreeD camera id the event concerns.
    pub camera: Option<u8>,
    /// Sample or datagram sequence number.
    pub sequence: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session label.
    pub fn with_session(mut self, session: &'a str) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach the session role.
    pub fn with_role(mut self, role: SessionRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Attach a camera id.
    pub fn with_camera(mut self, camera: u8) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Attach a sequence number.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Role rendered for log fields; empty when unset.
    pub fn role_str(&self) -> &'static str {
        self.role.map(<&'static str>::from).unwrap_or("")
    }
}

/// Outcome attached to session lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The session step completed normally.
    Success,
    /// The session was stopped by a cancellation request.
    Cancelled,
    /// The session step failed.
    Fault,
}

/// Emit a standardized session lifecycle event.
///
/// Successful and cancelled outcomes log at `INFO`, faults at `ERROR`.
pub fn log_session_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SessionOutcome,
) {
    let default = LogContext::default();
    let ctx = context.unwrap_or(&default);
    match outcome {
        SessionOutcome::Success | SessionOutcome::Cancelled => {
            crate::__freed_event!(tracing::Level::INFO, ctx, event = event, outcome = outcome.as_ref(); "{}", message)
        }
        SessionOutcome::Fault => {
            crate::__freed_event!(tracing::Level::ERROR, ctx, event = event, outcome = outcome.as_ref(); "{}", message)
        }
    }
}

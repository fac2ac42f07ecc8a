//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Shared primitives and utilities for the FreeD toolkit."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
//! Shared primitives for the FreeD toolkit workspace.
//! This crate exposes session configuration, cancellation, pacing, logging
//! setup and version metadata consumed across the workspace.

pub mod cancel;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod pacing;
pub mod time;
pub mod version;

pub use cancel::{cancel_on_shutdown_signal, cancel_pair, CancelHandle, CancelSignal};
pub use config::{
    sender_bind_addr, ErrorPolicy, ListenerConfig, LoggingConfig, ReplayConfig, SimulatorConfig,
    DEFAULT_PORT,
};
pub use logging::{init_tracing, LogFormat};
pub use metrics::{JitterHistogram, JitterSummary};
pub use pacing::{Pacer, Paced};
pub use version::VersionInfo;

//! ---
//! freed_section: "11-simulation"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Simulation error taxonomy."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::simulator::SimState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown pattern '{0}' (expected one of: circle, figure8, oscillate)")]
    UnknownPattern(String),
    #[error("invalid pattern spec: {0}")]
    InvalidSpec(String),
    #[error("invalid simulator configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind sender socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("send of sample {sequence} to {target} failed after {sent} datagrams: {source}")]
    Send {
        sequence: u64,
        target: SocketAddr,
        sent: u64,
        #[source]
        source: io::Error,
    },
    #[error("simulator already ran (state {0})")]
    NotIdle(SimState),
}

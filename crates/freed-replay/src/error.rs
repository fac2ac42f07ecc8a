//! ---
//! freed_section: "11-simulation-test-harness"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Replay error taxonomy."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("unable to open pose log {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid pose log header: {0}")]
    Header(#[source] csv::Error),
    #[error("invalid pose log row at line {line}: {message}")]
    Row { line: u64, message: String },
    #[error("pose log contains no records")]
    Empty,
    #[error("pose log contains no valid records to replay")]
    NoValidRecords,
    #[error("invalid replay configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind replay socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

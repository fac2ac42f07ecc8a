//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Typed session options shared by the CLI and the engines."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};

use crate::logging::LogFormat;

/// Port FreeD consumers conventionally listen on.
pub const DEFAULT_PORT: u16 = 6000;

/// Receive buffers smaller than this cannot hold a frame plus slack.
pub const MIN_RECV_BUFFER: usize = 64;

fn default_listen_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_target_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_recv_buffer() -> usize {
    4096
}

fn default_rate_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_progress_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_speed() -> f64 {
    1.0
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Options for a listening validation session.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_listen_ip")]
    pub ip: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Stop after this long without a datagram. Restarts on every datagram.
    #[serde(default)]
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub inactivity_timeout: Option<Duration>,
    /// Stop this long after the session starts, whatever arrives.
    #[serde(default)]
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub duration: Option<Duration>,
    /// Spacing of live packet-rate events.
    #[serde(default = "default_rate_interval")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub rate_interval: Duration,
    #[serde(default = "default_recv_buffer")]
    pub recv_buffer: usize,
}

impl ListenerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer < MIN_RECV_BUFFER {
            return Err(anyhow!(
                "recv_buffer must be at least {} bytes (got {})",
                MIN_RECV_BUFFER,
                self.recv_buffer
            ));
        }
        if let Some(timeout) = self.inactivity_timeout {
            if timeout.is_zero() {
                return Err(anyhow!("inactivity timeout must be greater than zero"));
            }
        }
        if self.duration.is_some_and(|limit| limit.is_zero()) {
            return Err(anyhow!("listen duration must be greater than zero"));
        }
        if self.rate_interval.is_zero() {
            return Err(anyhow!("rate interval must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            ip: default_listen_ip(),
            port: default_port(),
            inactivity_timeout: None,
            duration: None,
            rate_interval: default_rate_interval(),
            recv_buffer: default_recv_buffer(),
        }
    }
}

/// Unspecified local address of the same family as `target`, port zero.
pub fn sender_bind_addr(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

/// What to do when a datagram cannot be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Report the failure and keep sending.
    #[default]
    Continue,
    /// Report the failure and end the run.
    StopOnError,
}

/// Options for a simulation session.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_target_ip")]
    pub target_ip: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Repeat the pattern until cancelled instead of stopping after one pass.
    #[serde(default)]
    pub continuous: bool,
    /// Minimum spacing between progress log lines.
    #[serde(default = "default_progress_interval")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub progress_interval: Duration,
}

impl SimulatorConfig {
    pub fn target(&self) -> SocketAddr {
        SocketAddr::new(self.target_ip, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("target port must be non-zero"));
        }
        if self.target_ip.is_unspecified() {
            return Err(anyhow!(
                "target address {} is unspecified; pick a host to send to",
                self.target_ip
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            target_ip: default_target_ip(),
            port: default_port(),
            error_policy: ErrorPolicy::default(),
            continuous: false,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Options for replaying a recorded pose log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_target_ip")]
    pub target_ip: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Playback speed factor; 2.0 plays twice as fast.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub looped: bool,
}

impl ReplayConfig {
    pub fn target(&self) -> SocketAddr {
        SocketAddr::new(self.target_ip, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(anyhow!(
                "speed must be a positive number (got {})",
                self.speed
            ));
        }
        if self.port == 0 {
            return Err(anyhow!("target port must be non-zero"));
        }
        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            target_ip: default_target_ip(),
            port: default_port(),
            speed: default_speed(),
            looped: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Explicit filter directive; overrides `FREED_LOG` and `RUST_LOG`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            filter: None,
        }
    }
}

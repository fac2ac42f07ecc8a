//! ---
//! freed_section: "02-protocol"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "UDP listener feeding the packet validator."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use freed_common::time::achieved_rate;
use freed_common::{CancelSignal, ListenerConfig};
use freed_logging::{freed_debug, freed_info, freed_warn, log_session_event, LogContext};
use freed_logging::{SessionOutcome, SessionRole};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::report::PacketReport;
use crate::summary::ValidationSummary;
use crate::validator::PacketValidator;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("port unavailable: cannot bind {addr}: {source}")]
    PortUnavailable {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("invalid listener configuration: {0}")]
    InvalidConfig(String),
}

/// Events delivered to the caller of [`Listener::run`].
#[derive(Debug)]
pub enum ListenerEvent<'a> {
    /// The socket is bound and the receive loop is about to start.
    Ready { local_addr: SocketAddr },
    /// One datagram, in arrival order.
    Packet(&'a PacketReport),
    /// Datagrams per second over the last rate interval.
    Rate {
        packets_per_second: f64,
        total: u64,
    },
}

/// Why a listening session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    Cancelled,
    InactivityTimeout,
    DurationElapsed,
}

enum Wait {
    Received(io::Result<(usize, SocketAddr)>),
    TimedOut,
    DurationElapsed,
    RateTick,
    Cancelled,
}

/// Consecutive receive failures tolerated before backing off.
const RECV_ERROR_STREAK: u32 = 3;
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Pause before the next receive after `streak` consecutive failures.
fn recv_backoff(streak: u32) -> Option<Duration> {
    (streak >= RECV_ERROR_STREAK).then_some(RECV_ERROR_BACKOFF)
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Owns one UDP socket and validates everything that arrives on it.
#[derive(Debug)]
pub struct Listener {
    socket: UdpSocket,
    config: ListenerConfig,
    validator: PacketValidator,
}

impl Listener {
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        config
            .validate()
            .map_err(|err| ListenerError::InvalidConfig(err.to_string()))?;
        let addr = config.bind_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ListenerError::PortUnavailable { addr, source })?;
        Ok(Self {
            socket,
            config: config.clone(),
            validator: PacketValidator::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn validator(&self) -> &PacketValidator {
        &self.validator
    }

    pub fn summary(&self) -> ValidationSummary {
        self.validator.summary()
    }

    /// Receive and report datagrams until cancelled, idle for longer than
    /// the inactivity timeout, or past the total session duration.
    ///
    /// The summary is reset when the session starts. `on_event` first sees
    /// [`ListenerEvent::Ready`], then one [`ListenerEvent::Packet`] per
    /// datagram, with a [`ListenerEvent::Rate`] every rate interval.
    pub async fn run<F>(
        &mut self,
        cancel: &mut CancelSignal,
        mut on_event: F,
    ) -> Result<ListenerExit, ListenerError>
    where
        F: FnMut(ListenerEvent<'_>),
    {
        self.validator.reset();
        let local_addr = self.socket.local_addr().map_err(|source| {
            ListenerError::PortUnavailable {
                addr: self.config.bind_addr(),
                source,
            }
        })?;
        let ctx = LogContext::new().with_role(SessionRole::Validator);
        freed_info!(context = ctx.clone(), "listening for FreeD packets on {}", local_addr);
        on_event(ListenerEvent::Ready { local_addr });

        let started = Instant::now();
        let session_end = self.config.duration.map(|limit| started + limit);
        let mut last_datagram = started;
        let mut ticker = interval_at(started + self.config.rate_interval, self.config.rate_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut window_start = started;
        let mut window_packets = 0u64;

        let mut buf = vec![0u8; self.config.recv_buffer];
        let mut sequence = 0u64;
        let mut error_streak = 0u32;
        let exit = loop {
            let idle_end = self
                .config
                .inactivity_timeout
                .map(|limit| last_datagram + limit);
            let wait = tokio::select! {
                biased;
                _ = cancel.cancelled() => Wait::Cancelled,
                _ = sleep_until_some(session_end) => Wait::DurationElapsed,
                _ = sleep_until_some(idle_end) => Wait::TimedOut,
                _ = ticker.tick() => Wait::RateTick,
                result = self.socket.recv_from(&mut buf) => Wait::Received(result),
            };

            match wait {
                Wait::Cancelled => break ListenerExit::Cancelled,
                Wait::DurationElapsed => break ListenerExit::DurationElapsed,
                Wait::TimedOut => break ListenerExit::InactivityTimeout,
                Wait::RateTick => {
                    let now = Instant::now();
                    on_event(ListenerEvent::Rate {
                        packets_per_second: achieved_rate(window_packets, now - window_start),
                        total: self.validator.summary().total(),
                    });
                    window_start = now;
                    window_packets = 0;
                }
                Wait::Received(Ok((len, source))) => {
                    error_streak = 0;
                    last_datagram = Instant::now();
                    sequence += 1;
                    window_packets += 1;
                    let report = self.validator.inspect(source, &buf[..len]);
                    freed_debug!(
                        context = ctx.clone().with_sequence(sequence),
                        "{} byte datagram from {} classified as {}",
                        len,
                        source,
                        report.kind()
                    );
                    on_event(ListenerEvent::Packet(&report));
                }
                Wait::Received(Err(err)) => {
                    error_streak = error_streak.saturating_add(1);
                    self.validator.counter().record_recv_error();
                    if error_streak == 1 {
                        freed_warn!(context = ctx.clone(), "receive failed: {}", err);
                    } else {
                        freed_debug!(
                            context = ctx.clone(),
                            "receive failed ({} in a row): {}",
                            error_streak,
                            err
                        );
                    }
                    if let Some(pause) = recv_backoff(error_streak) {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break ListenerExit::Cancelled,
                            _ = tokio::time::sleep(pause) => {}
                        }
                    }
                }
            }
        };

        let summary = self.validator.summary();
        let (event, outcome) = match exit {
            ListenerExit::Cancelled => ("listener.cancelled", SessionOutcome::Cancelled),
            ListenerExit::InactivityTimeout => ("listener.timeout", SessionOutcome::Success),
            ListenerExit::DurationElapsed => ("listener.duration_elapsed", SessionOutcome::Success),
        };
        log_session_event(Some(&ctx), event, &summary.to_string(), outcome);
        Ok(exit)
    }
}

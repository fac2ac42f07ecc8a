//! ---
//! freed_section: "11-simulation"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Rate-paced UDP sender for motion patterns."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use freed_common::time::achieved_rate;
use freed_common::{
    sender_bind_addr, CancelSignal, ErrorPolicy, JitterHistogram, JitterSummary, Pacer, Paced,
    SimulatorConfig,
};
use freed_logging::{
    freed_debug, freed_info, freed_warn, log_session_event, LogContext, SessionOutcome,
    SessionRole,
};
use freed_proto::encode;
use serde::Serialize;
use strum::{AsRefStr, Display};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::SimError;
use crate::generator::{MotionGenerator, PoseSample};
use crate::pattern::PatternSpec;

/// Lifecycle of a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SimState {
    Idle,
    Running,
    Completed,
    Cancelled,
    /// A send failed under [`ErrorPolicy::StopOnError`].
    Failed,
}

impl SimState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SimState::Completed | SimState::Cancelled | SimState::Failed
        )
    }
}

/// Per-datagram notification passed to the `on_sample` callback.
#[derive(Debug)]
pub enum SampleEvent<'a> {
    Sent(&'a PoseSample),
    Failed {
        sample: &'a PoseSample,
        error: &'a io::Error,
    },
}

/// Outcome of one simulator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub state: SimState,
    pub target: SocketAddr,
    pub sent: u64,
    pub failed: u64,
    /// Samples in the planned run; `None` when running continuously.
    pub planned: Option<u64>,
    pub elapsed: Duration,
    pub achieved_rate_hz: f64,
    pub jitter: Option<JitterSummary>,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simulation {}: sent {} frames to {} over {:.1} seconds ({:.1} packets/second)",
            self.state,
            self.sent,
            self.target,
            self.elapsed.as_secs_f64(),
            self.achieved_rate_hz
        )?;
        if let Some(planned) = self.planned {
            write!(f, ", {} planned", planned)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if let Some(jitter) = &self.jitter {
            write!(
                f,
                ", jitter mean {:.0} us max {} us",
                jitter.mean_us, jitter.max_us
            )?;
        }
        Ok(())
    }
}

/// Drives one pattern over one UDP socket.
#[derive(Debug)]
pub struct Simulator {
    generator: MotionGenerator,
    config: SimulatorConfig,
    state: SimState,
    report: Option<SimulationReport>,
}

enum Stop {
    Completed,
    Cancelled,
    Failed(u64, io::Error),
}

impl Simulator {
    pub fn new(spec: PatternSpec, config: SimulatorConfig) -> Result<Self, SimError> {
        config
            .validate()
            .map_err(|err| SimError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            generator: MotionGenerator::new(spec),
            config,
            state: SimState::Idle,
            report: None,
        })
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn spec(&self) -> &PatternSpec {
        self.generator.spec()
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Samples a single run sends; `None` for continuous runs.
    pub fn planned(&self) -> Option<u64> {
        if self.config.continuous {
            None
        } else {
            Some(self.generator.spec().sample_count())
        }
    }

    /// Report of the finished run, including failed ones.
    pub fn report(&self) -> Option<&SimulationReport> {
        self.report.as_ref()
    }

    /// Send every sample at `start + offset` until the pattern ends, the
    /// signal fires, or a send fails under [`ErrorPolicy::StopOnError`].
    ///
    /// Cancellation is observed while waiting for each deadline and right
    /// before each send.
    pub async fn run<F>(
        &mut self,
        cancel: &mut CancelSignal,
        mut on_sample: F,
    ) -> Result<SimulationReport, SimError>
    where
        F: FnMut(SampleEvent<'_>),
    {
        if self.state != SimState::Idle {
            return Err(SimError::NotIdle(self.state));
        }
        let target = self.config.target();
        let local = sender_bind_addr(&target);
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| SimError::Bind {
                addr: local,
                source,
            })?;

        let kind = self.generator.spec().kind().to_string();
        let ctx = LogContext::new()
            .with_session(&kind)
            .with_role(SessionRole::Simulator)
            .with_camera(self.generator.spec().camera_id());
        freed_info!(
            context = ctx.clone(),
            "simulating {} pattern at {} Hz towards {}",
            kind,
            self.generator.spec().rate_hz(),
            target
        );

        self.state = SimState::Running;
        let pacer = Pacer::start();
        let jitter = JitterHistogram::default();
        let mut sent = 0u64;
        let mut failed = 0u64;
        let mut last_progress = Instant::now();
        let mut cycle = 0u64;

        let stop = 'run: loop {
            for sample in self.generator.cycle(cycle) {
                match pacer.wait_until(sample.offset, cancel).await {
                    Paced::Cancelled => break 'run Stop::Cancelled,
                    Paced::Due { lateness } => jitter.record(lateness),
                }
                let frame = encode(&sample.pose);
                match socket.send_to(frame.as_ref(), target).await {
                    Ok(_) => {
                        sent += 1;
                        on_sample(SampleEvent::Sent(&sample));
                    }
                    Err(err) => {
                        failed += 1;
                        freed_warn!(
                            context = ctx.clone().with_sequence(sample.sequence),
                            "send to {} failed: {}",
                            target,
                            err
                        );
                        on_sample(SampleEvent::Failed {
                            sample: &sample,
                            error: &err,
                        });
                        if self.config.error_policy == ErrorPolicy::StopOnError {
                            break 'run Stop::Failed(sample.sequence, err);
                        }
                    }
                }
                if last_progress.elapsed() >= self.config.progress_interval {
                    last_progress = Instant::now();
                    freed_debug!(
                        context = ctx.clone().with_sequence(sample.sequence),
                        "frame {} pose {}",
                        sample.sequence,
                        sample.pose
                    );
                }
            }
            if !self.config.continuous {
                break Stop::Completed;
            }
            cycle += 1;
        };

        let elapsed = pacer.elapsed();
        let (state, outcome) = match &stop {
            Stop::Completed => (SimState::Completed, SessionOutcome::Success),
            Stop::Cancelled => (SimState::Cancelled, SessionOutcome::Cancelled),
            Stop::Failed(..) => (SimState::Failed, SessionOutcome::Fault),
        };
        self.state = state;
        let report = SimulationReport {
            state,
            target,
            sent,
            failed,
            planned: self.planned(),
            elapsed,
            achieved_rate_hz: achieved_rate(sent, elapsed),
            jitter: jitter.summary(),
        };
        log_session_event(
            Some(&ctx),
            "simulator.finished",
            &report.to_string(),
            outcome,
        );
        self.report = Some(report.clone());

        match stop {
            Stop::Failed(sequence, source) => Err(SimError::Send {
                sequence,
                target,
                sent,
                source,
            }),
            Stop::Completed | Stop::Cancelled => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternKind;
    use freed_common::cancel_pair;
    use std::net::{IpAddr, Ipv4Addr, UdpSocket as StdUdpSocket};

    fn spec(duration_ms: u64, rate: f64) -> PatternSpec {
        PatternSpec::builder(PatternKind::Circle)
            .duration(Duration::from_millis(duration_ms))
            .rate_hz(rate)
            .build()
            .unwrap()
    }

    fn config_for(receiver: &StdUdpSocket) -> SimulatorConfig {
        SimulatorConfig {
            target_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: receiver.local_addr().unwrap().port(),
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = SimulatorConfig {
            port: 0,
            ..SimulatorConfig::default()
        };
        assert!(matches!(
            Simulator::new(spec(100, 10.0), config),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn completes_a_short_run() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let mut simulator = Simulator::new(spec(200, 50.0), config_for(&receiver)).unwrap();
        assert_eq!(simulator.state(), SimState::Idle);
        assert_eq!(simulator.planned(), Some(10));

        let mut sequences = Vec::new();
        let report = simulator
            .run(&mut CancelSignal::never(), |event| {
                if let SampleEvent::Sent(sample) = event {
                    sequences.push(sample.sequence);
                }
            })
            .await
            .unwrap();

        assert_eq!(report.state, SimState::Completed);
        assert_eq!(report.sent, 10);
        assert_eq!(report.failed, 0);
        assert_eq!(sequences, (0..10).collect::<Vec<_>>());
        assert_eq!(simulator.state(), SimState::Completed);
        assert!(report.elapsed >= Duration::from_millis(180));
        assert_eq!(simulator.report(), Some(&report));
    }

    #[tokio::test]
    async fn second_run_is_rejected() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let mut simulator = Simulator::new(spec(40, 50.0), config_for(&receiver)).unwrap();
        simulator
            .run(&mut CancelSignal::never(), |_| {})
            .await
            .unwrap();
        assert!(matches!(
            simulator.run(&mut CancelSignal::never(), |_| {}).await,
            Err(SimError::NotIdle(SimState::Completed))
        ));
    }

    fn broadcast_config(error_policy: ErrorPolicy) -> SimulatorConfig {
        // Broadcast without SO_BROADCAST is refused by the kernel.
        SimulatorConfig {
            target_ip: IpAddr::V4(Ipv4Addr::BROADCAST),
            port: 6000,
            error_policy,
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test]
    async fn stop_on_error_fails_the_run() {
        let mut simulator =
            Simulator::new(spec(100, 50.0), broadcast_config(ErrorPolicy::StopOnError)).unwrap();
        let mut failures = 0;
        let result = simulator
            .run(&mut CancelSignal::never(), |event| {
                if let SampleEvent::Failed { .. } = event {
                    failures += 1;
                }
            })
            .await;
        match result {
            Err(SimError::Send { sequence, sent, .. }) => {
                assert_eq!(sequence, 0);
                assert_eq!(sent, 0);
            }
            other => panic!("expected a send failure, got {other:?}"),
        }
        assert_eq!(failures, 1);
        assert_eq!(simulator.state(), SimState::Failed);
        assert_eq!(simulator.report().map(|report| report.failed), Some(1));
    }

    #[tokio::test]
    async fn continue_policy_counts_failures_and_completes() {
        let mut simulator =
            Simulator::new(spec(100, 50.0), broadcast_config(ErrorPolicy::Continue)).unwrap();
        let report = simulator
            .run(&mut CancelSignal::never(), |_| {})
            .await
            .unwrap();
        assert_eq!(report.state, SimState::Completed);
        assert_eq!(report.failed, 5);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test]
    async fn continuous_run_stops_on_cancel() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let config = SimulatorConfig {
            continuous: true,
            ..config_for(&receiver)
        };
        let mut simulator = Simulator::new(spec(100, 100.0), config).unwrap();
        assert_eq!(simulator.planned(), None);

        let (handle, mut signal) = cancel_pair();
        let mut last_sequence = 0;
        let report = simulator
            .run(&mut signal, |event| {
                if let SampleEvent::Sent(sample) = event {
                    last_sequence = sample.sequence;
                    // Past the first 10-sample pass.
                    if sample.sequence == 25 {
                        handle.cancel();
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(report.state, SimState::Cancelled);
        assert_eq!(report.sent, 26);
        assert_eq!(last_sequence, 25);
        assert_eq!(report.planned, None);
    }

    #[tokio::test]
    async fn continuous_jitter_covers_every_pass() {
        let receiver = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let config = SimulatorConfig {
            continuous: true,
            ..config_for(&receiver)
        };
        // 5-sample passes; cancel during the eighth.
        let mut simulator = Simulator::new(spec(50, 100.0), config).unwrap();
        let (handle, mut signal) = cancel_pair();
        let report = simulator
            .run(&mut signal, |event| {
                if let SampleEvent::Sent(sample) = event {
                    if sample.sequence == 37 {
                        handle.cancel();
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(report.sent, 38);
        let jitter = report.jitter.expect("jitter recorded");
        assert_eq!(jitter.samples, 38);
        assert!(jitter.min_us <= jitter.max_us);
        assert!(jitter.mean_us >= jitter.min_us as f64 && jitter.mean_us <= jitter.max_us as f64);
    }
}

//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "binary"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "`freed simulate`: send a synthetic motion pattern."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use freed_common::{
    cancel_on_shutdown_signal, cancel_pair, ErrorPolicy, SimulatorConfig, DEFAULT_PORT,
};
use freed_sim::{OrientationMode, PatternKind, PatternSpec, Plane, SampleEvent, Simulator};

#[derive(Debug, Args)]
pub struct SimulateCommand {
    /// Motion pattern: circle, figure8 or oscillate
    pattern: String,

    /// Destination address
    #[arg(long, env = "FREED_TARGET_IP", default_value = "127.0.0.1")]
    ip: IpAddr,

    /// Destination UDP port
    #[arg(long, env = "FREED_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Packets per second
    #[arg(long, default_value_t = 30.0)]
    rate: f64,

    /// Seconds to run; 0 repeats the pattern until interrupted
    #[arg(long, value_name = "SECS", default_value_t = 0.0)]
    duration: f64,

    /// Seconds per revolution
    #[arg(long, value_name = "SECS", default_value_t = 10.0)]
    period: f64,

    /// Pattern radius or amplitude in millimetres
    #[arg(long, default_value_t = 1000.0)]
    radius: f64,

    /// Camera height in millimetres
    #[arg(long, default_value_t = 2000.0)]
    height: f64,

    /// Plane the pattern is traced in: xy, xz or yz
    #[arg(long, default_value = "xy")]
    plane: Plane,

    /// Camera orientation: tangent, center or fixed:<pan>,<tilt>,<roll>
    #[arg(long, default_value = "tangent")]
    orientation: String,

    /// FreeD camera id carried in every frame
    #[arg(long, default_value_t = 1)]
    camera_id: u8,

    /// Raw zoom encoder count
    #[arg(long)]
    zoom: Option<u32>,

    /// Raw focus encoder count
    #[arg(long)]
    focus: Option<u32>,

    /// End the run at the first failed send
    #[arg(long)]
    stop_on_error: bool,
}

/// How long one run lasts and whether it repeats.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunPlan {
    duration: Duration,
    revolutions: f64,
    continuous: bool,
}

impl SimulateCommand {
    fn plan(&self) -> Result<RunPlan> {
        let period = Duration::try_from_secs_f64(self.period)
            .ok()
            .filter(|period| !period.is_zero())
            .ok_or_else(|| anyhow!("--period must be a positive number of seconds"))?;
        if self.duration == 0.0 {
            return Ok(RunPlan {
                duration: period,
                revolutions: 1.0,
                continuous: true,
            });
        }
        let duration = Duration::try_from_secs_f64(self.duration)
            .map_err(|_| anyhow!("--duration must be a non-negative number of seconds"))?;
        Ok(RunPlan {
            duration,
            revolutions: self.duration / self.period,
            continuous: false,
        })
    }

    /// Parses the pattern name before anything else so an unknown pattern
    /// fails without touching the network.
    fn build(&self) -> Result<(PatternSpec, SimulatorConfig)> {
        let kind: PatternKind = self.pattern.parse()?;
        let orientation: OrientationMode = self.orientation.parse()?;
        let plan = self.plan()?;

        let mut builder = PatternSpec::builder(kind)
            .radius(self.radius)
            .center(0.0, 0.0, self.height)
            .plane(self.plane)
            .revolutions(plan.revolutions)
            .orientation(orientation)
            .camera_id(self.camera_id)
            .duration(plan.duration)
            .rate_hz(self.rate);
        if let Some(zoom) = self.zoom {
            builder = builder.zoom(zoom);
        }
        if let Some(focus) = self.focus {
            builder = builder.focus(focus);
        }
        let spec = builder.build()?;

        let config = SimulatorConfig {
            target_ip: self.ip,
            port: self.port,
            error_policy: if self.stop_on_error {
                ErrorPolicy::StopOnError
            } else {
                ErrorPolicy::Continue
            },
            continuous: plan.continuous,
            ..SimulatorConfig::default()
        };
        Ok((spec, config))
    }

    pub async fn execute(self) -> Result<()> {
        let (spec, config) = self.build()?;
        let progress_every = spec.rate_hz().round().max(1.0) as u64;
        let mut simulator = Simulator::new(spec, config)?;

        println!(
            "Simulating {} pattern to {}:{} at {} Hz{} (Ctrl+C to stop)",
            spec.kind(),
            self.ip,
            self.port,
            spec.rate_hz(),
            if simulator.planned().is_none() { ", continuous" } else { "" }
        );

        let (handle, mut signal) = cancel_pair();
        let watcher = cancel_on_shutdown_signal(handle);
        let result = simulator
            .run(&mut signal, |event| {
                if let SampleEvent::Sent(sample) = event {
                    if sample.sequence % progress_every == 0 {
                        let pose = &sample.pose;
                        println!(
                            "Frame: {}, Pos: ({:.1}, {:.1}, {:.1}), Rot: ({:.1}, {:.1}, {:.1})",
                            sample.sequence,
                            pose.x(),
                            pose.y(),
                            pose.z(),
                            pose.pan(),
                            pose.tilt(),
                            pose.roll()
                        );
                    }
                }
            })
            .await;
        watcher.abort();

        if let Some(report) = simulator.report() {
            println!("{report}");
        }
        result.context("simulation failed")?;
        Ok(())
    }
}

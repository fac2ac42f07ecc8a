//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "binary"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "`freed replay` and `freed analyze` over recorded pose logs."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use freed_common::{cancel_on_shutdown_signal, cancel_pair, ReplayConfig, DEFAULT_PORT};
use freed_replay::{analyze, PoseLog, Replayer};

#[derive(Debug, Args)]
pub struct ReplayCommand {
    /// CSV pose log to replay
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Destination address
    #[arg(long, env = "FREED_TARGET_IP", default_value = "127.0.0.1")]
    ip: IpAddr,

    /// Destination UDP port
    #[arg(long, env = "FREED_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Start over when the log ends
    #[arg(long = "loop")]
    looped: bool,
}

impl ReplayCommand {
    pub async fn execute(self) -> Result<()> {
        let log = PoseLog::from_path(&self.log)?;
        let config = ReplayConfig {
            target_ip: self.ip,
            port: self.port,
            speed: self.speed,
            looped: self.looped,
        };
        let replayer = Replayer::new(log, config)?;
        println!(
            "Replaying {} valid of {} packets from {} to {}:{} (Ctrl+C to stop)",
            replayer.log().valid_records().count(),
            replayer.log().len(),
            self.log.display(),
            self.ip,
            self.port
        );

        let (handle, mut signal) = cancel_pair();
        let watcher = cancel_on_shutdown_signal(handle);
        let summary = replayer.run(&mut signal, |_| {}).await;
        watcher.abort();
        let summary = summary.context("replay failed")?;
        println!("{summary}");
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// CSV pose log to analyse
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
}

impl AnalyzeCommand {
    pub fn execute(self) -> Result<()> {
        let log = PoseLog::from_path(&self.log)?;
        let analysis = analyze(&log);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        } else {
            println!("{analysis}");
        }
        Ok(())
    }
}

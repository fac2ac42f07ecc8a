//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "binary"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "`freed validate`: listen and report on incoming packets."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use freed_common::{cancel_on_shutdown_signal, cancel_pair, ListenerConfig, DEFAULT_PORT};
use freed_validator::{Listener, ListenerEvent, ListenerExit};

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Address to listen on
    #[arg(long, env = "FREED_LISTEN_IP", default_value = "0.0.0.0")]
    ip: IpAddr,

    /// UDP port to listen on
    #[arg(long, env = "FREED_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Stop after this many seconds without a packet
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Stop after listening for this many seconds in total
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,

    /// Print the packet rate once per second
    #[arg(long)]
    rate: bool,

    /// Receive buffer size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = 4096)]
    recv_buffer: usize,
}

impl ValidateCommand {
    fn config(&self) -> Result<ListenerConfig> {
        Ok(ListenerConfig {
            ip: self.ip,
            port: self.port,
            inactivity_timeout: seconds("--timeout", self.timeout)?,
            duration: seconds("--duration", self.duration)?,
            recv_buffer: self.recv_buffer,
            ..ListenerConfig::default()
        })
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.config()?;
        let mut listener = Listener::bind(&config)
            .await
            .context("starting validator")?;

        let (handle, mut signal) = cancel_pair();
        let watcher = cancel_on_shutdown_signal(handle);

        let exit = listener
            .run(&mut signal, |event| match event {
                ListenerEvent::Ready { local_addr } => {
                    println!("Listening for FreeD packets on {local_addr} (Ctrl+C to stop)");
                }
                ListenerEvent::Packet(report) => println!("{report}"),
                ListenerEvent::Rate {
                    packets_per_second,
                    total,
                } => {
                    if self.rate {
                        println!("Rate: {packets_per_second:.1} packets/second ({total} total)");
                    }
                }
            })
            .await;
        watcher.abort();
        let exit = exit.context("validator session failed")?;

        match exit {
            ListenerExit::InactivityTimeout => println!(
                "No packets received for {:.1} seconds, stopping",
                self.timeout.unwrap_or_default()
            ),
            ListenerExit::DurationElapsed => println!(
                "Listened for {:.1} seconds, stopping",
                self.duration.unwrap_or_default()
            ),
            ListenerExit::Cancelled => {}
        }
        println!("{}", listener.summary());
        Ok(())
    }
}

fn seconds(flag: &str, value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|_| anyhow!("{flag} must be a non-negative number of seconds"))
        })
        .transpose()
}

//! ---
//! freed_section: "11-simulation-test-harness"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Paced UDP replay of recorded pose logs."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::fmt;
use std::time::Duration;

use freed_common::time::scale_offset;
use freed_common::{sender_bind_addr, CancelSignal, Pacer, Paced, ReplayConfig};
use freed_logging::{
    freed_info, freed_warn, log_session_event, LogContext, SessionOutcome, SessionRole,
};
use freed_proto::encode;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::ReplayError;
use crate::log::{PoseLog, PoseRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayExit {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub exit: ReplayExit,
    pub sent: u64,
    pub failed: u64,
    /// Invalid records skipped, counted once per pass.
    pub skipped: u64,
    pub passes: u64,
    pub elapsed: Duration,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.exit {
            ReplayExit::Completed => "complete",
            ReplayExit::Cancelled => "stopped",
        };
        write!(
            f,
            "Replay {verb}: {} packets sent over {} pass(es) in {:.1} seconds, {} invalid skipped",
            self.sent,
            self.passes,
            self.elapsed.as_secs_f64(),
            self.skipped
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

/// Sends the valid records of a [`PoseLog`] at their recorded pace.
#[derive(Debug)]
pub struct Replayer {
    log: PoseLog,
    config: ReplayConfig,
}

impl Replayer {
    pub fn new(log: PoseLog, config: ReplayConfig) -> Result<Self, ReplayError> {
        config
            .validate()
            .map_err(|err| ReplayError::InvalidConfig(err.to_string()))?;
        if log.valid_records().next().is_none() {
            return Err(ReplayError::NoValidRecords);
        }
        Ok(Self { log, config })
    }

    pub fn log(&self) -> &PoseLog {
        &self.log
    }

    /// Replay until the log ends (or forever when looping) or `cancel` fires.
    ///
    /// Each valid record is sent at `pass start + offset / speed`, where the
    /// offset is measured from the first record of the log.
    pub async fn run<F>(
        &self,
        cancel: &mut CancelSignal,
        mut on_record: F,
    ) -> Result<ReplaySummary, ReplayError>
    where
        F: FnMut(&PoseRecord),
    {
        let target = self.config.target();
        let local = sender_bind_addr(&target);
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| ReplayError::Bind {
                addr: local,
                source,
            })?;

        let ctx = LogContext::new().with_role(SessionRole::Replay);
        let valid = self.log.valid_records().count();
        let skipped_per_pass = (self.log.len() - valid) as u64;
        freed_info!(
            context = ctx.clone(),
            "replaying {} packets to {} at {}x{}",
            valid,
            target,
            self.config.speed,
            if self.config.looped { " (loop enabled)" } else { "" }
        );

        let started = Instant::now();
        let mut sent = 0u64;
        let mut failed = 0u64;
        let mut skipped = 0u64;
        let mut passes = 0u64;

        let exit = 'replay: loop {
            let pacer = Pacer::start();
            passes += 1;
            skipped += skipped_per_pass;
            for record in self.log.valid_records() {
                let offset = scale_offset(self.log.offset_of(record), self.config.speed);
                if let Paced::Cancelled = pacer.wait_until(offset, cancel).await {
                    break 'replay ReplayExit::Cancelled;
                }
                let frame = encode(&record.pose);
                match socket.send_to(frame.as_ref(), target).await {
                    Ok(_) => {
                        sent += 1;
                        on_record(record);
                    }
                    Err(err) => {
                        failed += 1;
                        freed_warn!(
                            context = ctx.clone().with_sequence(record.frame),
                            "send to {} failed: {}",
                            target,
                            err
                        );
                    }
                }
            }
            if !self.config.looped {
                break ReplayExit::Completed;
            }
            freed_info!(context = ctx.clone(), "restarting replay");
        };

        let summary = ReplaySummary {
            exit,
            sent,
            failed,
            skipped,
            passes,
            elapsed: started.elapsed(),
        };
        let outcome = match exit {
            ReplayExit::Completed => SessionOutcome::Success,
            ReplayExit::Cancelled => SessionOutcome::Cancelled,
        };
        log_session_event(Some(&ctx), "replay.finished", &summary.to_string(), outcome);
        Ok(summary)
    }
}

//! ---
//! freed_section: "01-core-functionality"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Absolute-time pacing for rate-controlled senders."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use crate::cancel::CancelSignal;

/// Result of waiting for a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paced {
    /// The deadline passed; `lateness` is how far behind it we woke.
    Due { lateness: Duration },
    Cancelled,
}

/// Schedules work at fixed offsets from a single origin.
///
/// Every deadline is `origin + offset`, so a late wake-up never pushes later
/// deadlines back and timing error does not accumulate.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    origin: Instant,
}

impl Pacer {
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    pub fn deadline(&self, offset: Duration) -> Instant {
        self.origin + offset
    }

    /// Sleep until `origin + offset` unless cancelled first.
    pub async fn wait_until(&self, offset: Duration, cancel: &mut CancelSignal) -> Paced {
        if cancel.is_cancelled() {
            return Paced::Cancelled;
        }
        let deadline = self.deadline(offset);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Paced::Cancelled,
            _ = sleep_until(deadline) => {
                if cancel.is_cancelled() {
                    Paced::Cancelled
                } else {
                    Paced::Due {
                        lateness: Instant::now().saturating_duration_since(deadline),
                    }
                }
            }
        }
    }
}

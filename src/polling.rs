//! Cancelable fixed-interval timer driving auto-detect.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Opaque token identifying one polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollHandle(u64);

impl fmt::Display for PollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poll#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("polling loop {0} is still running")]
    AlreadyRunning(PollHandle),
}

struct ActiveLoop {
    handle: PollHandle,
    task: JoinHandle<()>,
}

/// Runs at most one periodic tick task at a time.
///
/// Stopping aborts the task immediately: no tick fires after `stop` returns.
/// Work a tick already handed off elsewhere (a spawned request, a queued
/// event) is not recalled, which is why every tick carries its handle.
pub struct PollingLoop {
    active: Option<ActiveLoop>,
    next_id: u64,
}

impl PollingLoop {
    pub fn new() -> Self {
        Self {
            active: None,
            next_id: 1,
        }
    }

    /// Call `tick` every `interval`, first after one full interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, interval: Duration, mut tick: F) -> Result<PollHandle, PollError>
    where
        F: FnMut(PollHandle) + Send + 'static,
    {
        if let Some(active) = &self.active {
            return Err(PollError::AlreadyRunning(active.handle));
        }

        let handle = PollHandle(self.next_id);
        self.next_id += 1;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick(handle);
            }
        });

        info!(%handle, interval_ms = interval.as_millis() as u64, "Polling started");
        self.active = Some(ActiveLoop { handle, task });
        Ok(handle)
    }

    /// Cancel the run identified by `handle`.
    ///
    /// Returns `false` if `handle` is not the live run (already stopped, or
    /// superseded), in which case nothing changes.
    pub fn stop(&mut self, handle: PollHandle) -> bool {
        match &self.active {
            Some(active) if active.handle == handle => {
                self.cancel();
                true
            }
            _ => {
                debug!(%handle, "Stop requested for a polling run that is not live");
                false
            }
        }
    }

    /// Cancel whatever run is live. Idempotent.
    pub fn cancel(&mut self) -> Option<PollHandle> {
        let active = self.active.take()?;
        active.task.abort();
        info!(handle = %active.handle, "Polling stopped");
        Some(active.handle)
    }

    /// Handle of the live run, if any.
    pub fn current(&self) -> Option<PollHandle> {
        self.active.as_ref().map(|a| a.handle)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl Default for PollingLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

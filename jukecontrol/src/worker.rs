use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::display::WakeSignal;
use crate::errors::JukeboxError;

/// Running flag of a worker loop.
///
/// Sleeps are waits on the flag's own signal, so [`RunFlag::stop`] ends
/// them immediately.
#[derive(Debug)]
pub struct RunFlag {
    running: AtomicBool,
    wake: WakeSignal,
}

impl RunFlag {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            wake: WakeSignal::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.signal();
    }

    /// Sleeps for `duration` unless stopped first. Returns `is_running()`.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_running() {
            self.wake.wait(duration);
        }
        self.is_running()
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns a named worker thread.
pub fn spawn_worker<F>(name: &str, body: F) -> Result<JoinHandle<()>, JukeboxError>
where
    F: FnOnce() + Send + 'static,
{
    debug!(worker = name, "Starting worker thread");
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|e| JukeboxError::Spawn(name.to_string(), e.to_string()))
}

/// Loop helper shared by the polling workers: runs `step` then sleeps
/// `interval`, until the flag is cleared.
pub fn run_periodic<F>(name: &str, flag: &Arc<RunFlag>, interval: Duration, mut step: F)
where
    F: FnMut(),
{
    while flag.is_running() {
        step();
        if !flag.sleep(interval) {
            break;
        }
    }
    debug!(worker = name, "Worker thread exiting");
}

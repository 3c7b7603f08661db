use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

/// Single-slot wake-up signal.
///
/// A signal raised while nobody waits is kept until the next [`wait`];
/// repeated signals coalesce into one.
///
/// [`wait`]: WakeSignal::wait
#[derive(Clone, Debug)]
pub struct WakeSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl WakeSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    pub fn signal(&self) {
        // full means a wake-up is already pending
        let _ = self.tx.try_send(());
    }

    /// Blocks until signalled or until `timeout` elapses.
    /// Returns `true` when woken by a signal.
    pub fn wait(&self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

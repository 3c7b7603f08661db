//! Idle power-off observer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::capabilities::PowerControl;
use crate::coordinator::PlaybackCoordinator;
use crate::display::{DisplayPanel, RendererControl};
use crate::worker::{RunFlag, run_periodic};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleCheck {
    Playing,
    Idle(Duration),
    PoweredOff,
    /// The power-off command failed; the display is handed back and the
    /// next check tries again.
    PowerOffFailed,
    /// Power-off already requested; nothing more is checked.
    Done,
}

struct IdleState {
    last_playing: Instant,
    powered_off: bool,
}

pub struct IdleObserver {
    coordinator: Arc<PlaybackCoordinator>,
    panel: Arc<DisplayPanel>,
    renderer: Arc<RendererControl>,
    power: Mutex<Box<dyn PowerControl>>,
    farewell: [String; 2],
    shutdown_after: Duration,
    check_interval: Duration,
    state: Mutex<IdleState>,
}

impl IdleObserver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Arc<PlaybackCoordinator>,
        panel: Arc<DisplayPanel>,
        renderer: Arc<RendererControl>,
        power: Box<dyn PowerControl>,
        farewell: [String; 2],
        shutdown_after: Duration,
        check_interval: Duration,
        started_at: Instant,
    ) -> Self {
        Self {
            coordinator,
            panel,
            renderer,
            power: Mutex::new(power),
            farewell,
            shutdown_after,
            check_interval,
            state: Mutex::new(IdleState {
                last_playing: started_at,
                powered_off: false,
            }),
        }
    }

    pub fn run(&self, flag: &Arc<RunFlag>) {
        run_periodic("idle", flag, self.check_interval, || {
            if self.check_at(Instant::now()) == IdleCheck::PoweredOff {
                flag.stop();
            }
        });
    }

    pub fn check_at(&self, now: Instant) -> IdleCheck {
        let mut state = self.state.lock();
        if state.powered_off {
            return IdleCheck::Done;
        }

        let playing = self.coordinator.backend_reports_playing().unwrap_or_else(|err| {
            warn!(error = %err, "Cannot query playback status, assuming playing");
            true
        });
        if playing {
            state.last_playing = now;
            return IdleCheck::Playing;
        }

        let idle_for = now.saturating_duration_since(state.last_playing);
        if idle_for < self.shutdown_after {
            return IdleCheck::Idle(idle_for);
        }

        info!(idle_secs = idle_for.as_secs(), "Idle timeout reached, powering off");
        state.powered_off = true;
        let guard = self.renderer.pause_for_update();
        self.panel.set_enabled(true);
        self.panel.write_frame(&self.farewell[0], &self.farewell[1]);

        match self.power.lock().power_off() {
            Ok(()) => {
                self.renderer.stop();
                drop(guard);
                IdleCheck::PoweredOff
            }
            Err(err) => {
                error!(error = %err, "Power off failed, display resumes");
                state.powered_off = false;
                drop(guard);
                IdleCheck::PowerOffFailed
            }
        }
    }
}

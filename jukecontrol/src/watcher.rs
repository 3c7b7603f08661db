//! Drift observer.
//!
//! The backend advances to the next track on its own. The observer polls
//! the current track id and rewrites the display whenever it no longer
//! matches the one last shown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::coordinator::PlaybackCoordinator;
use crate::now_playing::NowPlaying;
use crate::worker::{RunFlag, run_periodic};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriftCheck {
    NotPlaying,
    InSync,
    Resynced,
    Failed,
}

pub struct DriftObserver {
    coordinator: Arc<PlaybackCoordinator>,
    now_playing: Arc<NowPlaying>,
    interval: Duration,
}

impl DriftObserver {
    pub fn new(
        coordinator: Arc<PlaybackCoordinator>,
        now_playing: Arc<NowPlaying>,
        interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            now_playing,
            interval,
        }
    }

    pub fn run(&self, flag: &Arc<RunFlag>) {
        run_periodic("drift", flag, self.interval, || {
            self.check_once();
        });
    }

    pub fn check_once(&self) -> DriftCheck {
        if !self.coordinator.is_playing() {
            return DriftCheck::NotPlaying;
        }

        let current = match self.coordinator.current_track_id() {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "Cannot poll current track");
                return DriftCheck::Failed;
            }
        };

        if current == self.now_playing.last_track_id() {
            return DriftCheck::InSync;
        }

        debug!(track = current.as_deref(), "Track changed behind the display");
        self.now_playing.refresh(None);
        DriftCheck::Resynced
    }
}

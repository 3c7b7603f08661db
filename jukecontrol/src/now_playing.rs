//! Persistent display update shared by buttons, RFID and the drift observer.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::coordinator::PlaybackCoordinator;
use crate::display::{DisplayState, RendererControl};

pub struct NowPlaying {
    coordinator: Arc<PlaybackCoordinator>,
    display: Arc<DisplayState>,
    renderer: Arc<RendererControl>,
    last_track_id: Mutex<Option<String>>,
}

impl NowPlaying {
    pub fn new(
        coordinator: Arc<PlaybackCoordinator>,
        display: Arc<DisplayState>,
        renderer: Arc<RendererControl>,
    ) -> Self {
        Self {
            coordinator,
            display,
            renderer,
            last_track_id: Mutex::new(None),
        }
    }

    /// Rewrites the persistent lines from the current collection and track.
    ///
    /// The renderer is paused for the whole update. When the backend cannot
    /// be queried the previous track line and track id are kept. `scroll`
    /// sets the scroll flag when given.
    pub fn refresh(&self, scroll: Option<bool>) {
        let _pause = self.renderer.pause_for_update();
        let mut last_track_id = self.last_track_id.lock();

        let line0 = self.coordinator.current_collection_title().unwrap_or_default();
        let line1 = match self.coordinator.current_track() {
            Ok(Some(track)) => {
                *last_track_id = Some(track.id);
                track.title
            }
            Ok(None) => {
                *last_track_id = None;
                String::new()
            }
            Err(err) => {
                warn!(error = %err, "Cannot query current track, keeping previous line");
                self.display.persistent_lines().1
            }
        };

        debug!(line0 = line0.as_str(), line1 = line1.as_str(), "Now playing updated");
        self.display.set_persistent(&line0, &line1);
        if let Some(enabled) = scroll {
            self.display.set_scroll_enabled(enabled);
        }
    }

    /// Track id pushed by the latest successful refresh.
    pub fn last_track_id(&self) -> Option<String> {
        self.last_track_id.lock().clone()
    }
}

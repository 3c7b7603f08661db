//! Playback coordinator.
//!
//! Owns the selected collection and the playing flag, and is the only
//! component issuing commands to the playback backend. Every public
//! operation holds the coordinator mutex for its whole duration, so the
//! backend always sees complete command groups in a total order.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::capabilities::PlaybackBackend;
use crate::errors::JukeboxError;
use crate::model::{CollectionId, Library, TrackInfo};

/// What the backend does once a collection has been loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterSwitch {
    /// Select the first track and stay stopped.
    Prime,
    /// Play if the backend was playing before the switch, prime otherwise.
    Resume,
    /// Always start playing.
    Play,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_collection_index: usize,
    pub is_playing: bool,
}

pub struct PlaybackCoordinator {
    backend: Arc<dyn PlaybackBackend>,
    library: Arc<Library>,
    state: Mutex<PlaybackState>,
}

/// Logs a failed best-effort backend command.
fn log_failure(command: &str, result: Result<(), JukeboxError>) {
    if let Err(err) = result {
        warn!(command, error = %err, "Backend command failed");
    }
}

impl PlaybackCoordinator {
    pub fn new(backend: Arc<dyn PlaybackBackend>, library: Arc<Library>) -> Self {
        Self {
            backend,
            library,
            state: Mutex::new(PlaybackState::default()),
        }
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// Loads the first collection into an empty playlist, turns repeat on
    /// and applies `initial_volume` when given. Nothing is played.
    pub fn initialize(&self, initial_volume: Option<u8>) {
        let mut state = self.state.lock();
        let backend = &self.backend;

        log_failure("clear", backend.clear_playlist());
        log_failure("update", backend.refresh_library());
        if let Some(first) = self.library.entry(0) {
            log_failure("add", backend.enqueue(first.collection_id.as_str()));
        }
        log_failure("repeat", backend.set_repeat(true));
        if let Some(volume) = initial_volume {
            log_failure("volume", backend.set_volume(volume.min(100)));
        }

        *state = PlaybackState::default();
        info!(collections = self.library.len(), "Playback backend initialized");
    }

    /// Flips between playing and paused. Returns the new playing flag.
    pub fn toggle_play_pause(&self) -> bool {
        let mut state = self.state.lock();
        if state.is_playing {
            log_failure("pause", self.backend.pause());
            state.is_playing = false;
        } else {
            log_failure("play", self.backend.play());
            state.is_playing = true;
        }
        debug!(playing = state.is_playing, "Play/pause toggled");
        state.is_playing
    }

    pub fn next(&self) {
        let _state = self.state.lock();
        log_failure("next", self.backend.next());
    }

    pub fn prev(&self) {
        let _state = self.state.lock();
        log_failure("prev", self.backend.prev());
    }

    /// Applies a relative volume change and returns the absolute volume
    /// re-read from the backend.
    pub fn adjust_volume(&self, delta: i32) -> Result<u8, JukeboxError> {
        let _state = self.state.lock();
        log_failure("volume", self.backend.adjust_volume(delta));
        self.backend.volume()
    }

    pub fn query_volume_percent(&self) -> Result<u8, JukeboxError> {
        let _state = self.state.lock();
        self.backend.volume()
    }

    /// Advances to the next collection (wrapping) and leaves the backend
    /// stopped on its first track.
    pub fn switch_to_next_collection(&self) -> CollectionId {
        let mut state = self.state.lock();
        let index = (state.current_collection_index + 1) % self.library.len();
        self.load_collection(&mut state, index, AfterSwitch::Prime);
        self.collection_at(index)
    }

    /// Selects `id`, resuming playback when the backend was playing.
    pub fn switch_to_collection(&self, id: &CollectionId) -> Result<(), JukeboxError> {
        self.switch_with(id, AfterSwitch::Resume)
    }

    /// Selects `id` and chooses what happens afterwards, in one command group.
    pub fn switch_with(&self, id: &CollectionId, after: AfterSwitch) -> Result<(), JukeboxError> {
        let index = self
            .library
            .index_of(id)
            .ok_or_else(|| JukeboxError::UnknownCollection(id.to_string()))?;
        let mut state = self.state.lock();
        self.load_collection(&mut state, index, after);
        Ok(())
    }

    fn load_collection(
        &self,
        state: &mut MutexGuard<'_, PlaybackState>,
        index: usize,
        after: AfterSwitch,
    ) {
        let was_playing = state.is_playing;
        let id = self.collection_at(index);
        let backend = &self.backend;

        log_failure("stop", backend.stop());
        state.is_playing = false;
        log_failure("clear", backend.clear_playlist());
        log_failure("update", backend.refresh_library());
        log_failure("add", backend.enqueue(id.as_str()));
        state.current_collection_index = index;

        let play = match after {
            AfterSwitch::Prime => false,
            AfterSwitch::Resume => was_playing,
            AfterSwitch::Play => true,
        };
        if play {
            log_failure("play", backend.play());
            state.is_playing = true;
        } else {
            // play+pause selects the first track so the backend can report it
            log_failure("play", backend.play());
            log_failure("pause", backend.pause());
        }

        info!(collection = %id, playing = state.is_playing, "Collection switched");
    }

    fn collection_at(&self, index: usize) -> CollectionId {
        self.library
            .entry(index)
            .map(|entry| entry.collection_id.clone())
            .unwrap_or_else(|| CollectionId(String::new()))
    }

    /// Starts playback unless it is already running.
    pub fn ensure_playing(&self) {
        let mut state = self.state.lock();
        if !state.is_playing {
            log_failure("play", self.backend.play());
            state.is_playing = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().is_playing
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    pub fn current_collection(&self) -> CollectionId {
        let index = self.state.lock().current_collection_index;
        self.collection_at(index)
    }

    pub fn current_collection_title(&self) -> Option<String> {
        let index = self.state.lock().current_collection_index;
        self.library
            .entry(index)
            .map(|entry| entry.display_title.clone())
    }

    /// Current track, `Ok(None)` when the backend has nothing selected.
    pub fn current_track(&self) -> Result<Option<TrackInfo>, JukeboxError> {
        let _state = self.state.lock();
        let Some(id) = self.backend.current_track_id()? else {
            return Ok(None);
        };
        let title = self.backend.current_track_title()?.unwrap_or_default();
        Ok(Some(TrackInfo { id, title }))
    }

    pub fn current_track_id(&self) -> Result<Option<String>, JukeboxError> {
        let _state = self.state.lock();
        self.backend.current_track_id()
    }

    /// Playing flag as reported by the backend rather than the local state.
    pub fn backend_reports_playing(&self) -> Result<bool, JukeboxError> {
        let _state = self.state.lock();
        self.backend.is_playing()
    }
}

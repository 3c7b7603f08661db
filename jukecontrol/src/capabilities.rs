// jukecontrol/src/capabilities.rs
//! Collaborator contracts consumed by the controller core.
//!
//! The hardware drivers, the playback engine and the library storage live
//! outside this crate; the core only talks to them through these traits.

use std::path::Path;
use std::time::Duration;

use crate::errors::JukeboxError;
use crate::model::LibraryEntry;

/// Transport commands of the playback backend.
pub trait TransportControl {
    /// Starts or resumes playback.
    fn play(&self) -> Result<(), JukeboxError>;

    /// Pauses playback, keeping the position.
    fn pause(&self) -> Result<(), JukeboxError>;

    /// Stops playback.
    fn stop(&self) -> Result<(), JukeboxError>;

    fn next(&self) -> Result<(), JukeboxError>;

    fn prev(&self) -> Result<(), JukeboxError>;
}

/// Playlist management of the playback backend.
pub trait PlaylistControl {
    /// Removes every track from the current playlist.
    fn clear_playlist(&self) -> Result<(), JukeboxError>;

    /// Asks the backend to rescan its music directory.
    fn refresh_library(&self) -> Result<(), JukeboxError>;

    /// Appends a directory (or file) to the playlist.
    fn enqueue(&self, path: &str) -> Result<(), JukeboxError>;

    /// Enables or disables playlist repetition.
    fn set_repeat(&self, enabled: bool) -> Result<(), JukeboxError>;
}

/// Volume control. The backend is the source of truth for the volume.
pub trait VolumeControl {
    /// Current volume in percent.
    fn volume(&self) -> Result<u8, JukeboxError>;

    fn set_volume(&self, percent: u8) -> Result<(), JukeboxError>;

    /// Relative change, in percentage points.
    fn adjust_volume(&self, delta: i32) -> Result<(), JukeboxError>;
}

/// Status queries.
pub trait PlaybackStatus {
    /// Title of the current track, `None` when no track is selected.
    fn current_track_title(&self) -> Result<Option<String>, JukeboxError>;

    /// Stable identifier of the current track, `None` when no track is selected.
    fn current_track_id(&self) -> Result<Option<String>, JukeboxError>;

    /// Whether the backend itself reports that it is playing.
    fn is_playing(&self) -> Result<bool, JukeboxError>;
}

/// Full command surface of the playback backend.
pub trait PlaybackBackend:
    TransportControl + PlaylistControl + VolumeControl + PlaybackStatus + Send + Sync
{
}

impl<T> PlaybackBackend for T where
    T: TransportControl + PlaylistControl + VolumeControl + PlaybackStatus + Send + Sync
{
}

/// Two-line character display.
pub trait DisplaySurface: Send {
    /// Writes both lines; callers pass lines already fitted to the width.
    fn write_two_lines(&mut self, line0: &str, line1: &str) -> Result<(), JukeboxError>;

    fn set_enabled(&mut self, enabled: bool) -> Result<(), JukeboxError>;

    fn set_backlight(&mut self, on: bool) -> Result<(), JukeboxError>;

    fn clear(&mut self) -> Result<(), JukeboxError>;
}

/// RFID reader.
pub trait RfidReader: Send {
    /// Blocks until a tag is present or `timeout` elapses.
    ///
    /// Returns `true` when a tag answered.
    fn wait_for_tag(&mut self, timeout: Duration) -> Result<bool, JukeboxError>;

    /// Reads the uid of the tag in the field, `None` if it went away.
    fn read_uid(&mut self) -> Result<Option<Vec<u8>>, JukeboxError>;
}

/// Callback invoked on a rising edge, on a thread chosen by the edge source.
pub type EdgeCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// GPIO edge detection.
pub trait EdgeSource {
    fn on_rising_edge(&mut self, pin: u8, callback: EdgeCallback) -> Result<(), JukeboxError>;
}

/// Storage of the track library.
pub trait LibraryStore {
    fn load(&self) -> Result<Vec<LibraryEntry>, JukeboxError>;
}

/// Fire-and-forget sound effects.
pub trait SoundEffectPlayer: Send + Sync {
    fn play(&self, path: &Path);
}

/// Powers the device off.
pub trait PowerControl: Send {
    fn power_off(&mut self) -> Result<(), JukeboxError>;
}

//! Collaborateurs factices partagés par les tests d'intégration.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use jukecontrol::settings::SequenceSettings;
use jukecontrol::{
    ButtonCode, Collaborators, DisplaySurface, EdgeCallback, EdgeSource, HiddenAction, Jukebox,
    JukeboxError, JukeboxSettings, Library, LibraryEntry, NetworkProbe, PlaybackStatus,
    PlaylistControl, PowerControl, RfidReader, RfidUid, SoundEffectPlayer, TransportControl,
    VolumeControl,
};

pub const STORIES_UID: [u8; 4] = [176, 223, 243, 121];

// ============================================================================
// Lecteur audio
// ============================================================================

#[derive(Default)]
struct Player {
    playlist: Vec<String>,
    directory: String,
    position: Option<usize>,
    playing: bool,
    volume: u8,
}

/// Lecteur audio en mémoire qui journalise chaque commande avec le thread
/// appelant.
pub struct FakeBackend {
    log: Mutex<Vec<(ThreadId, String)>>,
    player: Mutex<Player>,
    collections: HashMap<String, Vec<String>>,
    pub fail_status: AtomicBool,
    delay: Duration,
}

impl FakeBackend {
    pub fn new() -> Self {
        let mut collections = HashMap::new();
        collections.insert(
            "tag-01".to_string(),
            vec!["Chapter 1".to_string(), "Chapter 2".to_string()],
        );
        collections.insert(
            "tag-02".to_string(),
            vec![
                "A song with a rather long title".to_string(),
                "Lullaby".to_string(),
            ],
        );
        Self {
            log: Mutex::new(Vec::new()),
            player: Mutex::new(Player {
                volume: 60,
                ..Player::default()
            }),
            collections,
            fail_status: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    /// Ralentit chaque commande pour provoquer des entrelacements.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn record(&self, command: String) -> Result<(), JukeboxError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.log.lock().push((thread::current().id(), command));
        Ok(())
    }

    pub fn commands(&self) -> Vec<String> {
        self.log.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(ThreadId, String)> {
        self.log.lock().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    pub fn set_volume_raw(&self, volume: u8) {
        self.player.lock().volume = volume;
    }

    pub fn is_backend_playing(&self) -> bool {
        self.player.lock().playing
    }

    fn status_guard(&self) -> Result<(), JukeboxError> {
        if self.fail_status.load(Ordering::SeqCst) {
            Err(JukeboxError::BackendUnavailable("status".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TransportControl for FakeBackend {
    fn play(&self) -> Result<(), JukeboxError> {
        {
            let mut player = self.player.lock();
            if player.position.is_none() && !player.playlist.is_empty() {
                player.position = Some(0);
            }
            player.playing = player.position.is_some();
        }
        self.record("play".into())
    }

    fn pause(&self) -> Result<(), JukeboxError> {
        self.player.lock().playing = false;
        self.record("pause".into())
    }

    fn stop(&self) -> Result<(), JukeboxError> {
        let mut player = self.player.lock();
        player.playing = false;
        player.position = None;
        drop(player);
        self.record("stop".into())
    }

    fn next(&self) -> Result<(), JukeboxError> {
        self.advance(1);
        self.record("next".into())
    }

    fn prev(&self) -> Result<(), JukeboxError> {
        self.advance(-1);
        self.record("prev".into())
    }
}

impl FakeBackend {
    /// Avance d'une piste comme le ferait le lecteur en fin de piste.
    pub fn advance(&self, delta: isize) {
        let mut player = self.player.lock();
        let len = player.playlist.len() as isize;
        if let Some(position) = player.position {
            if len > 0 {
                player.position = Some((position as isize + delta).rem_euclid(len) as usize);
            }
        }
    }
}

impl PlaylistControl for FakeBackend {
    fn clear_playlist(&self) -> Result<(), JukeboxError> {
        let mut player = self.player.lock();
        player.playlist.clear();
        player.position = None;
        drop(player);
        self.record("clear".into())
    }

    fn refresh_library(&self) -> Result<(), JukeboxError> {
        self.record("update".into())
    }

    fn enqueue(&self, path: &str) -> Result<(), JukeboxError> {
        {
            let mut player = self.player.lock();
            player.directory = path.to_string();
            player.playlist = self.collections.get(path).cloned().unwrap_or_default();
        }
        self.record(format!("add {path}"))
    }

    fn set_repeat(&self, enabled: bool) -> Result<(), JukeboxError> {
        self.record(format!("repeat {}", if enabled { "on" } else { "off" }))
    }
}

impl VolumeControl for FakeBackend {
    fn volume(&self) -> Result<u8, JukeboxError> {
        Ok(self.player.lock().volume)
    }

    fn set_volume(&self, percent: u8) -> Result<(), JukeboxError> {
        self.player.lock().volume = percent;
        self.record(format!("volume {percent}"))
    }

    fn adjust_volume(&self, delta: i32) -> Result<(), JukeboxError> {
        {
            let mut player = self.player.lock();
            player.volume = (i32::from(player.volume) + delta).clamp(0, 100) as u8;
        }
        self.record(format!("volume {delta:+}"))
    }
}

impl PlaybackStatus for FakeBackend {
    fn current_track_title(&self) -> Result<Option<String>, JukeboxError> {
        self.status_guard()?;
        let player = self.player.lock();
        Ok(player
            .position
            .and_then(|position| player.playlist.get(position).cloned()))
    }

    fn current_track_id(&self) -> Result<Option<String>, JukeboxError> {
        self.status_guard()?;
        let player = self.player.lock();
        Ok(player
            .position
            .map(|position| format!("{}/{:02}", player.directory, position + 1)))
    }

    fn is_playing(&self) -> Result<bool, JukeboxError> {
        self.status_guard()?;
        Ok(self.player.lock().playing)
    }
}

// ============================================================================
// Afficheur
// ============================================================================

#[derive(Default)]
pub struct SurfaceLog {
    pub frames: Vec<(String, String)>,
    pub enabled: Vec<bool>,
    pub backlight: Vec<bool>,
    pub clears: usize,
}

/// Afficheur qui enregistre tout ce qui lui est écrit.
#[derive(Clone, Default)]
pub struct RecordingSurface(pub Arc<Mutex<SurfaceLog>>);

impl RecordingSurface {
    pub fn frames(&self) -> Vec<(String, String)> {
        self.0.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<(String, String)> {
        self.0.lock().frames.last().cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.0.lock().frames.len()
    }

    pub fn clears(&self) -> usize {
        self.0.lock().clears
    }
}

impl DisplaySurface for RecordingSurface {
    fn write_two_lines(&mut self, line0: &str, line1: &str) -> Result<(), JukeboxError> {
        self.0
            .lock()
            .frames
            .push((line0.to_string(), line1.to_string()));
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), JukeboxError> {
        self.0.lock().enabled.push(enabled);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), JukeboxError> {
        self.0.lock().backlight.push(on);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), JukeboxError> {
        self.0.lock().clears += 1;
        Ok(())
    }
}

// ============================================================================
// Lecteur RFID, boutons, sons, alimentation
// ============================================================================

/// Lecteur RFID alimenté par un canal.
pub struct ScriptedReader {
    tags: Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl ScriptedReader {
    pub fn new() -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = unbounded();
        (
            tx,
            Self {
                tags: rx,
                pending: None,
            },
        )
    }
}

impl RfidReader for ScriptedReader {
    fn wait_for_tag(&mut self, timeout: Duration) -> Result<bool, JukeboxError> {
        match self.tags.recv_timeout(timeout) {
            Ok(uid) => {
                self.pending = Some(uid);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn read_uid(&mut self) -> Result<Option<Vec<u8>>, JukeboxError> {
        Ok(self.pending.take())
    }
}

#[derive(Default)]
pub struct FakeEdges {
    callbacks: HashMap<u8, EdgeCallback>,
}

impl FakeEdges {
    pub fn press(&self, pin: u8) {
        if let Some(callback) = self.callbacks.get(&pin) {
            callback();
        }
    }

    pub fn pins(&self) -> Vec<u8> {
        let mut pins: Vec<u8> = self.callbacks.keys().copied().collect();
        pins.sort_unstable();
        pins
    }
}

impl EdgeSource for FakeEdges {
    fn on_rising_edge(&mut self, pin: u8, callback: EdgeCallback) -> Result<(), JukeboxError> {
        self.callbacks.insert(pin, callback);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSounds {
    pub played: Mutex<Vec<PathBuf>>,
}

impl RecordingSounds {
    pub fn count(&self) -> usize {
        self.played.lock().len()
    }
}

impl SoundEffectPlayer for RecordingSounds {
    fn play(&self, path: &Path) {
        self.played.lock().push(path.to_path_buf());
    }
}

pub struct CountingPower(pub Arc<AtomicUsize>);

impl PowerControl for CountingPower {
    fn power_off(&mut self) -> Result<(), JukeboxError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Extinction refusée (par exemple `sudo` sans droits), compte les essais.
pub struct FailingPower(pub Arc<AtomicUsize>);

impl PowerControl for FailingPower {
    fn power_off(&mut self) -> Result<(), JukeboxError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Err(JukeboxError::Power("permission denied".to_string()))
    }
}

// ============================================================================
// Données
// ============================================================================

pub fn library() -> Library {
    Library::new(vec![
        LibraryEntry::new("tag-01", "Stories", RfidUid::from_bytes(&STORIES_UID)),
        LibraryEntry::new("tag-02", "Songs", None),
    ])
    .unwrap()
}

/// Réglages rapides pour les tests : attentes courtes, séquences par défaut.
pub fn settings() -> JukeboxSettings {
    let mut settings = JukeboxSettings::default();
    settings.display.scroll_step_ms = 20;
    settings.display.pause_poll_ms = 5;
    settings.display.idle_refresh_ms = 50;
    settings.display.overlay_ms = 150;
    settings.rfid.wait_timeout_ms = 20;
    settings.drift.interval_ms = 20;
    settings.sequences = vec![
        SequenceSettings {
            name: "next_collection".into(),
            buttons: vec![ButtonCode::Prev, ButtonCode::PlayPause, ButtonCode::Next],
            action: HiddenAction::NextCollection,
        },
        SequenceSettings {
            name: "toggle_display".into(),
            buttons: vec![
                ButtonCode::VolumeDown,
                ButtonCode::VolumeUp,
                ButtonCode::VolumeDown,
                ButtonCode::VolumeUp,
            ],
            action: HiddenAction::ToggleDisplay,
        },
        SequenceSettings {
            name: "network_info".into(),
            buttons: vec![
                ButtonCode::Next,
                ButtonCode::Prev,
                ButtonCode::Next,
                ButtonCode::Prev,
            ],
            action: HiddenAction::ShowNetworkInfo,
        },
    ];
    settings
}

/// Attend qu'une condition devienne vraie, au plus `timeout`.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// ============================================================================
// Montage complet
// ============================================================================

/// Jukebox monté sur les collaborateurs factices.
pub struct Rig {
    pub jukebox: Jukebox,
    pub backend: Arc<FakeBackend>,
    pub surface: RecordingSurface,
    pub tags: Sender<Vec<u8>>,
    pub sounds: Arc<RecordingSounds>,
    pub power_offs: Arc<AtomicUsize>,
    pub edges: FakeEdges,
}

impl Rig {
    pub fn new(settings: JukeboxSettings) -> Self {
        Self::with_probe(settings, None)
    }

    pub fn with_probe(settings: JukeboxSettings, network_probe: Option<NetworkProbe>) -> Self {
        let backend = Arc::new(FakeBackend::new());
        let surface = RecordingSurface::default();
        let (tags, reader) = ScriptedReader::new();
        let sounds = Arc::new(RecordingSounds::default());
        let power_offs = Arc::new(AtomicUsize::new(0));

        let jukebox = Jukebox::new(
            settings,
            library(),
            Collaborators {
                backend: backend.clone(),
                surface: Box::new(surface.clone()),
                reader: Box::new(reader),
                sounds: sounds.clone(),
                power: Some(Box::new(CountingPower(Arc::clone(&power_offs)))),
                network_probe,
            },
        )
        .unwrap();

        Self {
            jukebox,
            backend,
            surface,
            tags,
            sounds,
            power_offs,
            edges: FakeEdges::default(),
        }
    }

    pub fn start(&mut self) {
        self.jukebox.start(&mut self.edges).unwrap();
    }

    /// Attend que le dernier cadre affiché corresponde aux deux lignes.
    pub fn wait_for_frame(&self, line0: &str, line1: &str) -> bool {
        let width = self.jukebox.settings().display.width;
        let expected = (fit(line0, width), fit(line1, width));
        wait_until(Duration::from_secs(3), || {
            self.surface.last_frame().as_ref() == Some(&expected)
        })
    }
}

pub fn fit(text: &str, width: usize) -> String {
    jukecontrol::display::text::fit(text, width)
}

//! Button dispatch.
//!
//! Edge callbacks land here on the edge source's threads. Debouncing is
//! checked first and lock-free with respect to other buttons; the rest of
//! the handling runs inside the dispatch mutex so sequence detection and
//! its action are never interleaved with another press.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use jukeutils::NetworkSummary;

use crate::capabilities::{EdgeSource, SoundEffectPlayer};
use crate::coordinator::PlaybackCoordinator;
use crate::display::{DisplayPanel, DisplayState};
use crate::errors::JukeboxError;
use crate::model::{ButtonCode, HiddenAction};
use crate::now_playing::NowPlaying;
use crate::rate_limiter::RateLimiter;
use crate::sequence::SequenceDetector;
use crate::settings::{ButtonPins, VolumeSettings};

/// Host name and address shown by the network-info overlay.
pub type NetworkProbe = Arc<dyn Fn() -> NetworkSummary + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Debounced,
    /// Presses arriving after `close`.
    Ignored,
    Hidden(HiddenAction),
    Default(ButtonCode),
}

pub struct DispatchTimings {
    pub debounce: Duration,
    pub overlay: Duration,
    pub network_info: Duration,
}

pub struct ButtonDispatcher {
    limiter: RateLimiter<ButtonCode>,
    detector: Mutex<SequenceDetector>,
    coordinator: Arc<PlaybackCoordinator>,
    now_playing: Arc<NowPlaying>,
    display: Arc<DisplayState>,
    panel: Arc<DisplayPanel>,
    sounds: Arc<dyn SoundEffectPlayer>,
    ping: PathBuf,
    volume: VolumeSettings,
    overlay: Duration,
    network_info: Duration,
    network_probe: NetworkProbe,
    accepting: AtomicBool,
}

impl ButtonDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        detector: SequenceDetector,
        coordinator: Arc<PlaybackCoordinator>,
        now_playing: Arc<NowPlaying>,
        display: Arc<DisplayState>,
        panel: Arc<DisplayPanel>,
        sounds: Arc<dyn SoundEffectPlayer>,
        ping: PathBuf,
        volume: VolumeSettings,
        timings: DispatchTimings,
    ) -> Self {
        Self {
            limiter: RateLimiter::new(timings.debounce),
            detector: Mutex::new(detector),
            coordinator,
            now_playing,
            display,
            panel,
            sounds,
            ping,
            volume,
            overlay: timings.overlay,
            network_info: timings.network_info,
            network_probe: Arc::new(jukeutils::network_summary),
            accepting: AtomicBool::new(true),
        }
    }

    pub fn with_network_probe(mut self, probe: NetworkProbe) -> Self {
        self.network_probe = probe;
        self
    }

    /// Stops reacting to presses; edge callbacks may outlive the jukebox.
    pub fn close(&self) {
        self.accepting.store(false, Ordering::SeqCst);
    }

    /// Registers one rising-edge callback per button pin.
    pub fn bind(
        self: &Arc<Self>,
        source: &mut dyn EdgeSource,
        pins: &ButtonPins,
    ) -> Result<(), JukeboxError> {
        for code in ButtonCode::ALL {
            let pin = pins.pin(code);
            let dispatcher = Arc::clone(self);
            source.on_rising_edge(
                pin,
                Box::new(move || {
                    dispatcher.on_edge(code, Instant::now());
                }),
            )?;
            debug!(button = code.label(), pin, "Button bound");
        }
        Ok(())
    }

    pub fn on_edge(&self, code: ButtonCode, now: Instant) -> DispatchOutcome {
        if !self.accepting.load(Ordering::SeqCst) {
            return DispatchOutcome::Ignored;
        }
        if !self.limiter.should_accept(&code, now) {
            return DispatchOutcome::Debounced;
        }

        let mut detector = self.detector.lock();
        let hidden = detector.record(code).map(|rule| rule.action);
        debug!(button = code.label(), "Button pressed");

        match hidden {
            Some(action) => {
                self.run_hidden(action);
                DispatchOutcome::Hidden(action)
            }
            None => {
                self.run_default(code);
                DispatchOutcome::Default(code)
            }
        }
    }

    fn run_default(&self, code: ButtonCode) {
        match code {
            ButtonCode::PlayPause => {
                self.coordinator.toggle_play_pause();
                self.now_playing.refresh(Some(true));
            }
            ButtonCode::Next => {
                self.coordinator.next();
                self.now_playing.refresh(Some(true));
            }
            ButtonCode::Prev => {
                self.coordinator.prev();
                self.now_playing.refresh(Some(true));
            }
            ButtonCode::VolumeUp => self.change_volume(self.volume.step, &self.volume.label_up),
            ButtonCode::VolumeDown => {
                self.change_volume(-self.volume.step, &self.volume.label_down)
            }
        }
    }

    fn change_volume(&self, delta: i32, label: &str) {
        match self.coordinator.adjust_volume(delta) {
            Ok(raw) => {
                let percent = self.volume.display_percent(raw);
                debug!(raw, percent, "Volume changed");
                self.display
                    .show_overlay(label, &self.volume.overlay_text(percent), self.overlay);
            }
            Err(err) => warn!(error = %err, "Cannot read back volume"),
        }
    }

    fn run_hidden(&self, action: HiddenAction) {
        info!(action = ?action, "Hidden sequence triggered");
        self.sounds.play(&self.ping);
        match action {
            HiddenAction::NextCollection => {
                let collection = self.coordinator.switch_to_next_collection();
                debug!(collection = %collection, "Next collection selected");
                self.now_playing.refresh(Some(true));
            }
            HiddenAction::ToggleDisplay => {
                let enabled = self.panel.toggle_enabled();
                if enabled {
                    // force a full redraw of the current frame
                    self.display.wake();
                }
                info!(enabled, "Display toggled");
            }
            HiddenAction::ShowNetworkInfo => {
                let summary = (self.network_probe)();
                self.display
                    .show_overlay(&summary.host_name, &summary.ip, self.network_info);
            }
        }
    }
}

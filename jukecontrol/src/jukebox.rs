//! Lifecycle of the controller: wiring, worker threads and shutdown.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::capabilities::{
    DisplaySurface, EdgeSource, PlaybackBackend, PowerControl, RfidReader, SoundEffectPlayer,
};
use crate::coordinator::PlaybackCoordinator;
use crate::dispatch::{ButtonDispatcher, DispatchTimings, NetworkProbe};
use crate::display::{DisplayPanel, DisplayRenderer, DisplayState, RendererControl, WakeSignal};
use crate::errors::JukeboxError;
use crate::idle::IdleObserver;
use crate::model::Library;
use crate::now_playing::NowPlaying;
use crate::rfid::RfidScanner;
use crate::sequence::SequenceDetector;
use crate::settings::JukeboxSettings;
use crate::watcher::DriftObserver;
use crate::worker::{RunFlag, spawn_worker};

/// External collaborators handed to [`Jukebox::new`].
pub struct Collaborators {
    pub backend: Arc<dyn PlaybackBackend>,
    pub surface: Box<dyn DisplaySurface>,
    pub reader: Box<dyn RfidReader>,
    pub sounds: Arc<dyn SoundEffectPlayer>,
    /// Needed by the idle observer only.
    pub power: Option<Box<dyn PowerControl>>,
    /// Replaces the host lookup of the network-info screen.
    pub network_probe: Option<NetworkProbe>,
}

pub struct Jukebox {
    settings: JukeboxSettings,
    coordinator: Arc<PlaybackCoordinator>,
    display: Arc<DisplayState>,
    panel: Arc<DisplayPanel>,
    renderer: Arc<RendererControl>,
    now_playing: Arc<NowPlaying>,
    dispatcher: Arc<ButtonDispatcher>,
    sounds: Arc<dyn SoundEffectPlayer>,
    reader: Option<Box<dyn RfidReader>>,
    power: Option<Box<dyn PowerControl>>,
    flags: Vec<Arc<RunFlag>>,
    workers: Vec<(String, JoinHandle<()>)>,
    started: bool,
    stopped: bool,
}

impl Jukebox {
    pub fn new(
        settings: JukeboxSettings,
        library: Library,
        collaborators: Collaborators,
    ) -> Result<Self, JukeboxError> {
        settings.validate()?;
        let Collaborators {
            backend,
            surface,
            reader,
            sounds,
            power,
            network_probe,
        } = collaborators;

        let wake = WakeSignal::new();
        let coordinator = Arc::new(PlaybackCoordinator::new(backend, Arc::new(library)));
        let display = Arc::new(DisplayState::new(wake.clone()));
        let renderer = Arc::new(RendererControl::new(wake));
        let panel = Arc::new(DisplayPanel::new(surface, settings.display.width));
        let now_playing = Arc::new(NowPlaying::new(
            Arc::clone(&coordinator),
            Arc::clone(&display),
            Arc::clone(&renderer),
        ));

        let detector = SequenceDetector::new(settings.sequence_rules())?;
        let mut dispatcher = ButtonDispatcher::new(
            detector,
            Arc::clone(&coordinator),
            Arc::clone(&now_playing),
            Arc::clone(&display),
            Arc::clone(&panel),
            Arc::clone(&sounds),
            PathBuf::from(&settings.sounds.ping),
            settings.volume.clone(),
            DispatchTimings {
                debounce: settings.buttons.debounce(),
                overlay: settings.display.overlay(),
                network_info: settings.display.network_info(),
            },
        );
        if let Some(probe) = network_probe {
            dispatcher = dispatcher.with_network_probe(probe);
        }

        Ok(Self {
            settings,
            coordinator,
            display,
            panel,
            renderer,
            now_playing,
            dispatcher: Arc::new(dispatcher),
            sounds,
            reader: Some(reader),
            power,
            flags: Vec::new(),
            workers: Vec::new(),
            started: false,
            stopped: false,
        })
    }

    /// Initializes the backend, shows the welcome screen, starts the
    /// workers and binds the buttons.
    pub fn start(&mut self, edges: &mut dyn EdgeSource) -> Result<(), JukeboxError> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        self.coordinator.initialize(self.settings.volume.initial);
        let [welcome0, welcome1] = &self.settings.display.welcome;
        self.display.set_persistent(welcome0, welcome1);
        self.display.set_scroll_enabled(false);

        self.spawn_renderer()?;
        self.spawn_rfid()?;
        self.spawn_drift()?;
        if self.settings.idle.enabled {
            self.spawn_idle()?;
        }

        self.dispatcher.bind(edges, &self.settings.buttons.pins)?;
        info!(workers = self.workers.len(), "Jukebox started");
        Ok(())
    }

    fn spawn_renderer(&mut self) -> Result<(), JukeboxError> {
        let renderer = DisplayRenderer::new(
            Arc::clone(&self.display),
            Arc::clone(&self.panel),
            Arc::clone(&self.renderer),
            self.settings.display.timing(),
        );
        let handle = spawn_worker("display", move || renderer.run())?;
        self.workers.push(("display".to_string(), handle));
        Ok(())
    }

    fn spawn_rfid(&mut self) -> Result<(), JukeboxError> {
        let Some(mut reader) = self.reader.take() else {
            return Ok(());
        };
        let scanner = RfidScanner::new(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.now_playing),
            Arc::clone(&self.sounds),
            PathBuf::from(&self.settings.sounds.ping),
            self.settings.rfid.wait_timeout(),
        );
        let flag = self.new_flag();
        let handle = spawn_worker("rfid", move || scanner.run(reader.as_mut(), &flag))?;
        self.workers.push(("rfid".to_string(), handle));
        Ok(())
    }

    fn spawn_drift(&mut self) -> Result<(), JukeboxError> {
        let observer = DriftObserver::new(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.now_playing),
            self.settings.drift.interval(),
        );
        let flag = self.new_flag();
        let handle = spawn_worker("drift", move || observer.run(&flag))?;
        self.workers.push(("drift".to_string(), handle));
        Ok(())
    }

    fn spawn_idle(&mut self) -> Result<(), JukeboxError> {
        let Some(power) = self.power.take() else {
            warn!("Idle power-off enabled without power control, skipping");
            return Ok(());
        };
        let observer = IdleObserver::new(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.panel),
            Arc::clone(&self.renderer),
            power,
            self.settings.display.farewell.clone(),
            self.settings.idle.shutdown_after(),
            self.settings.idle.check_interval(),
            Instant::now(),
        );
        let flag = self.new_flag();
        let handle = spawn_worker("idle", move || observer.run(&flag))?;
        self.workers.push(("idle".to_string(), handle));
        Ok(())
    }

    fn new_flag(&mut self) -> Arc<RunFlag> {
        let flag = Arc::new(RunFlag::new());
        self.flags.push(Arc::clone(&flag));
        flag
    }

    /// Stops and joins every worker, then shows the farewell screen.
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        self.dispatcher.close();
        for flag in &self.flags {
            flag.stop();
        }
        self.renderer.stop();
        self.display.wake();

        for (name, handle) in self.workers.drain(..) {
            debug!(worker = name.as_str(), "Joining worker thread");
            if handle.join().is_err() {
                warn!(worker = name.as_str(), "Worker thread panicked");
            }
        }

        let [farewell0, farewell1] = &self.settings.display.farewell;
        self.panel.set_enabled(true);
        self.panel.write_frame(farewell0, farewell1);
        info!("Jukebox stopped");
    }

    pub fn settings(&self) -> &JukeboxSettings {
        &self.settings
    }

    pub fn coordinator(&self) -> &Arc<PlaybackCoordinator> {
        &self.coordinator
    }

    pub fn display(&self) -> &Arc<DisplayState> {
        &self.display
    }

    pub fn panel(&self) -> &Arc<DisplayPanel> {
        &self.panel
    }

    pub fn renderer(&self) -> &Arc<RendererControl> {
        &self.renderer
    }

    pub fn now_playing(&self) -> &Arc<NowPlaying> {
        &self.now_playing
    }

    pub fn dispatcher(&self) -> &Arc<ButtonDispatcher> {
        &self.dispatcher
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Drop for Jukebox {
    fn drop(&mut self) {
        if self.started {
            self.shutdown();
        }
    }
}

//! Display renderer worker.
//!
//! The renderer is the only writer of frames computed from [`DisplayState`].
//! Other components reach the surface only through [`DisplayPanel`], which
//! serializes access and drops consecutive duplicate frames.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::state::{DisplaySnapshot, DisplayState};
use super::text::{cycle_len, fit, fits, scroll_window};
use super::wake::WakeSignal;
use crate::capabilities::DisplaySurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    Running,
    PausedForUpdate,
    Stopped,
}

/// Pause and stop switches of the renderer, shared with the updaters.
#[derive(Debug)]
pub struct RendererControl {
    pauses: AtomicUsize,
    stopped: AtomicBool,
    wake: WakeSignal,
}

impl RendererControl {
    pub fn new(wake: WakeSignal) -> Self {
        Self {
            pauses: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            wake,
        }
    }

    /// Pauses rendering until the returned guard is dropped. Pauses nest.
    pub fn pause_for_update(&self) -> PauseGuard<'_> {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        PauseGuard { control: self }
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.signal();
    }

    pub fn state(&self) -> RendererState {
        if self.stopped.load(Ordering::SeqCst) {
            RendererState::Stopped
        } else if self.pauses.load(Ordering::SeqCst) > 0 {
            RendererState::PausedForUpdate
        } else {
            RendererState::Running
        }
    }

    fn wait(&self, timeout: Duration) -> bool {
        self.wake.wait(timeout)
    }
}

#[must_use = "the renderer resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    control: &'a RendererControl,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.control.pauses.fetch_sub(1, Ordering::SeqCst);
        self.control.wake.signal();
    }
}

struct Surface {
    device: Box<dyn DisplaySurface>,
    last_frame: Option<(String, String)>,
}

/// Serialized access to the physical display.
pub struct DisplayPanel {
    surface: Mutex<Surface>,
    enabled: AtomicBool,
    width: usize,
}

impl DisplayPanel {
    pub fn new(device: Box<dyn DisplaySurface>, width: usize) -> Self {
        Self {
            surface: Mutex::new(Surface {
                device,
                last_frame: None,
            }),
            enabled: AtomicBool::new(true),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Writes both lines fitted to the panel width. Returns `true` when
    /// the frame reached the device; disabled panels and repeated frames
    /// are skipped.
    pub fn write_frame(&self, line0: &str, line1: &str) -> bool {
        let frame = (fit(line0, self.width), fit(line1, self.width));
        let mut surface = self.surface.lock();
        if !self.is_enabled() {
            return false;
        }
        if surface.last_frame.as_ref() == Some(&frame) {
            return false;
        }
        match surface.device.write_two_lines(&frame.0, &frame.1) {
            Ok(()) => {
                surface.last_frame = Some(frame);
                true
            }
            Err(err) => {
                warn!(error = %err, "Cannot write display frame");
                false
            }
        }
    }

    /// Switches the display and its backlight.
    pub fn set_enabled(&self, enabled: bool) {
        let mut surface = self.surface.lock();
        self.enabled.store(enabled, Ordering::SeqCst);
        if let Err(err) = surface.device.set_enabled(enabled) {
            warn!(error = %err, enabled, "Cannot switch display");
        }
        if let Err(err) = surface.device.set_backlight(enabled) {
            warn!(error = %err, enabled, "Cannot switch backlight");
        }
        // the device content is unknown after a power cycle
        surface.last_frame = None;
    }

    /// Flips the enabled flag and returns the new value.
    pub fn toggle_enabled(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    pub fn clear(&self) {
        let mut surface = self.surface.lock();
        if let Err(err) = surface.device.clear() {
            warn!(error = %err, "Cannot clear display");
        }
        surface.last_frame = None;
    }
}

/// Timing and layout parameters of the renderer loop.
#[derive(Clone, Debug)]
pub struct RendererTiming {
    pub scroll_step: Duration,
    pub pause_poll: Duration,
    pub idle_refresh: Duration,
    pub separator: String,
}

impl Default for RendererTiming {
    fn default() -> Self {
        Self {
            scroll_step: Duration::from_millis(200),
            pause_poll: Duration::from_millis(50),
            idle_refresh: Duration::from_secs(1),
            separator: "   ".to_string(),
        }
    }
}

/// Scroll cursor over line 1.
#[derive(Debug)]
pub struct Scroller {
    text: String,
    offset: usize,
    last_step: Instant,
    step: Duration,
}

impl Scroller {
    pub fn new(step: Duration) -> Self {
        Self {
            text: String::new(),
            offset: 0,
            last_step: Instant::now(),
            step,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Window of `width` characters for `text` at time `now`. A new text
    /// restarts at offset 0; otherwise the offset advances by one character
    /// once a step has elapsed. A late frame never skips characters.
    pub fn window(&mut self, text: &str, separator: &str, width: usize, now: Instant) -> String {
        if text != self.text {
            self.text = text.to_string();
            self.offset = 0;
            self.last_step = now;
        } else if now.saturating_duration_since(self.last_step) >= self.step {
            let cycle = cycle_len(text, separator).max(1);
            self.offset = (self.offset + 1) % cycle;
            self.last_step = now;
        }
        scroll_window(text, separator, self.offset, width)
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.offset = 0;
    }
}

pub struct DisplayRenderer {
    state: Arc<DisplayState>,
    panel: Arc<DisplayPanel>,
    control: Arc<RendererControl>,
    timing: RendererTiming,
}

impl DisplayRenderer {
    pub fn new(
        state: Arc<DisplayState>,
        panel: Arc<DisplayPanel>,
        control: Arc<RendererControl>,
        timing: RendererTiming,
    ) -> Self {
        Self {
            state,
            panel,
            control,
            timing,
        }
    }

    /// Renderer main loop. Returns once the control is stopped.
    pub fn run(&self) {
        let mut scroller = Scroller::new(self.timing.scroll_step);
        let mut scroll_mode: Option<bool> = None;

        debug!("Display renderer started");
        loop {
            match self.control.state() {
                RendererState::Stopped => break,
                RendererState::PausedForUpdate => {
                    self.control.wait(self.timing.pause_poll);
                    continue;
                }
                RendererState::Running => {}
            }

            let now = Instant::now();
            self.state.tick(now);
            let snapshot = self.state.snapshot();

            if scroll_mode != Some(snapshot.scroll_enabled) {
                if scroll_mode.is_some() {
                    self.panel.clear();
                }
                scroll_mode = Some(snapshot.scroll_enabled);
            }

            if snapshot.scroll_enabled && !fits(&snapshot.line1, self.panel.width()) {
                self.scroll_loop(&mut scroller);
                continue;
            }

            scroller.reset();
            self.panel.write_frame(&snapshot.line0, &snapshot.line1);
            self.control.wait(self.next_timeout(now));
        }
        debug!("Display renderer stopped");
    }

    /// Idle wait, shortened so an overlay is restored on time.
    fn next_timeout(&self, now: Instant) -> Duration {
        match self.state.overlay_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .min(self.timing.idle_refresh),
            None => self.timing.idle_refresh,
        }
    }

    fn scroll_loop(&self, scroller: &mut Scroller) {
        loop {
            if self.control.state() != RendererState::Running {
                return;
            }
            let now = Instant::now();
            if self.state.tick(now) {
                return;
            }
            let DisplaySnapshot {
                line0,
                line1,
                scroll_enabled,
            } = self.state.snapshot();
            if !scroll_enabled || fits(&line1, self.panel.width()) {
                return;
            }

            let window = scroller.window(&line1, &self.timing.separator, self.panel.width(), now);
            self.panel.write_frame(&line0, &window);
            self.control.wait(self.timing.scroll_step);
        }
    }
}

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::wake::WakeSignal;

/// What the renderer should show right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub line0: String,
    pub line1: String,
    pub scroll_enabled: bool,
}

#[derive(Debug)]
struct Overlay {
    expires_at: Instant,
    saved_lines: (String, String),
    saved_scroll: bool,
}

#[derive(Debug, Default)]
struct Screen {
    lines: (String, String),
    scroll_enabled: bool,
    overlay: Option<Overlay>,
}

/// Two-line text buffer with an optional transient overlay.
///
/// While an overlay is visible, persistent updates go to the saved buffer
/// and become visible when the overlay expires. Every mutation raises the
/// wake signal shared with the renderer.
#[derive(Debug)]
pub struct DisplayState {
    screen: Mutex<Screen>,
    wake: WakeSignal,
}

impl DisplayState {
    pub fn new(wake: WakeSignal) -> Self {
        Self {
            screen: Mutex::new(Screen::default()),
            wake,
        }
    }

    pub fn wake_signal(&self) -> &WakeSignal {
        &self.wake
    }

    pub fn wake(&self) {
        self.wake.signal();
    }

    pub fn show_overlay(&self, line0: &str, line1: &str, duration: Duration) {
        self.show_overlay_at(line0, line1, duration, Instant::now());
    }

    /// Shows `line0`/`line1` until `now + duration`. A second overlay
    /// replaces the visible text and the deadline but keeps the buffer
    /// saved by the first one.
    pub fn show_overlay_at(&self, line0: &str, line1: &str, duration: Duration, now: Instant) {
        {
            let mut screen = self.screen.lock();
            let expires_at = now + duration;
            let new_lines = (line0.to_string(), line1.to_string());
            let visible = std::mem::replace(&mut screen.lines, new_lines);
            match screen.overlay.as_mut() {
                Some(overlay) => overlay.expires_at = expires_at,
                None => {
                    let saved_scroll = screen.scroll_enabled;
                    screen.overlay = Some(Overlay {
                        expires_at,
                        saved_lines: visible,
                        saved_scroll,
                    });
                }
            }
            screen.scroll_enabled = false;
        }
        self.wake.signal();
    }

    pub fn set_persistent(&self, line0: &str, line1: &str) {
        {
            let mut screen = self.screen.lock();
            let lines = (line0.to_string(), line1.to_string());
            match screen.overlay.as_mut() {
                Some(overlay) => overlay.saved_lines = lines,
                None => screen.lines = lines,
            }
        }
        self.wake.signal();
    }

    pub fn set_scroll_enabled(&self, enabled: bool) {
        {
            let mut screen = self.screen.lock();
            match screen.overlay.as_mut() {
                Some(overlay) => overlay.saved_scroll = enabled,
                None => screen.scroll_enabled = enabled,
            }
        }
        self.wake.signal();
    }

    /// Lines that stay once any overlay has expired.
    pub fn persistent_lines(&self) -> (String, String) {
        let screen = self.screen.lock();
        match screen.overlay.as_ref() {
            Some(overlay) => overlay.saved_lines.clone(),
            None => screen.lines.clone(),
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let screen = self.screen.lock();
        DisplaySnapshot {
            line0: screen.lines.0.clone(),
            line1: screen.lines.1.clone(),
            scroll_enabled: screen.scroll_enabled,
        }
    }

    /// Restores the saved buffer once the overlay deadline has passed.
    /// Returns `true` when an overlay expired during this call.
    pub fn tick(&self, now: Instant) -> bool {
        {
            let mut screen = self.screen.lock();
            let expired = matches!(screen.overlay.as_ref(), Some(o) if now >= o.expires_at);
            if !expired {
                return false;
            }
            if let Some(overlay) = screen.overlay.take() {
                screen.lines = overlay.saved_lines;
                screen.scroll_enabled = overlay.saved_scroll;
            }
        }
        self.wake.signal();
        true
    }

    pub fn overlay_deadline(&self) -> Option<Instant> {
        self.screen.lock().overlay.as_ref().map(|o| o.expires_at)
    }

    pub fn has_overlay(&self) -> bool {
        self.screen.lock().overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DisplayState {
        let state = DisplayState::new(WakeSignal::new());
        state.set_persistent("Stories", "Chapter 1");
        state.set_scroll_enabled(true);
        state
    }

    #[test]
    fn test_expiry_fires_wake_signal() {
        let state = state();
        let t0 = Instant::now();
        state.show_overlay_at("Lauter", "Lautstärke: 24%", Duration::from_millis(10), t0);
        let wake = state.wake_signal();
        while wake.wait(Duration::from_millis(1)) {}

        assert!(!state.tick(t0 + Duration::from_millis(5)));
        assert!(!wake.wait(Duration::from_millis(1)));

        assert!(state.tick(t0 + Duration::from_millis(20)));
        assert!(wake.wait(Duration::from_millis(1)));
    }

    #[test]
    fn test_overlay_saves_and_restores() {
        let state = state();
        let t0 = Instant::now();
        state.show_overlay_at("Lauter", "Lautstärke: 24%", Duration::from_millis(1500), t0);

        let snap = state.snapshot();
        assert_eq!(snap.line0, "Lauter");
        assert!(!snap.scroll_enabled);

        assert!(!state.tick(t0 + Duration::from_millis(1000)));
        assert!(state.tick(t0 + Duration::from_millis(1500)));
        assert_eq!(
            state.snapshot(),
            DisplaySnapshot {
                line0: "Stories".into(),
                line1: "Chapter 1".into(),
                scroll_enabled: true,
            }
        );
        assert!(!state.tick(t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_second_overlay_keeps_saved_buffer() {
        let state = state();
        let t0 = Instant::now();
        state.show_overlay_at("Lauter", "Lautstärke: 24%", Duration::from_millis(1500), t0);
        state.show_overlay_at(
            "Lauter",
            "Lautstärke: 28%",
            Duration::from_millis(1500),
            t0 + Duration::from_millis(1000),
        );

        assert_eq!(state.snapshot().line1, "Lautstärke: 28%");
        // deadline follows the newest request
        assert!(!state.tick(t0 + Duration::from_millis(2000)));
        assert!(state.tick(t0 + Duration::from_millis(2500)));
        assert_eq!(state.snapshot().line0, "Stories");
        assert!(state.snapshot().scroll_enabled);
    }

    #[test]
    fn test_persistent_update_during_overlay_lands_after_expiry() {
        let state = state();
        let t0 = Instant::now();
        state.show_overlay_at("Leiser", "Lautstärke: 20%", Duration::from_millis(1500), t0);
        state.set_persistent("Songs", "Track A");
        state.set_scroll_enabled(false);

        assert_eq!(state.snapshot().line0, "Leiser");
        assert_eq!(state.persistent_lines(), ("Songs".into(), "Track A".into()));

        state.tick(t0 + Duration::from_secs(2));
        let snap = state.snapshot();
        assert_eq!((snap.line0.as_str(), snap.line1.as_str()), ("Songs", "Track A"));
        assert!(!snap.scroll_enabled);
    }

    #[test]
    fn test_mutations_raise_wake() {
        let state = DisplayState::new(WakeSignal::new());
        state.set_persistent("a", "b");
        assert!(state.wake_signal().wait(Duration::from_millis(10)));
        assert!(!state.wake_signal().wait(Duration::from_millis(10)));
        assert!(state.overlay_deadline().is_none());
    }
}

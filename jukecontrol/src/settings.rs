//! Typed view of the `jukebox` configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::RendererTiming;
use crate::errors::JukeboxError;
use crate::model::{ButtonCode, HiddenAction};
use crate::sequence::SequenceRule;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JukeboxSettings {
    pub buttons: ButtonSettings,
    pub sequences: Vec<SequenceSettings>,
    pub display: DisplaySettings,
    pub volume: VolumeSettings,
    pub rfid: RfidSettings,
    pub drift: DriftSettings,
    pub idle: IdleSettings,
    pub sounds: SoundSettings,
}

impl JukeboxSettings {
    pub fn sequence_rules(&self) -> Vec<SequenceRule> {
        self.sequences
            .iter()
            .map(|s| SequenceRule::new(&s.name, s.buttons.clone(), s.action))
            .collect()
    }

    pub fn validate(&self) -> Result<(), JukeboxError> {
        if self.display.width == 0 {
            return Err(JukeboxError::Config("display.width must be positive".into()));
        }
        if !self.volume.scale.is_finite() {
            return Err(JukeboxError::Config("volume.scale must be a number".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    pub debounce_ms: u64,
    pub pins: ButtonPins,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            pins: ButtonPins::default(),
        }
    }
}

impl ButtonSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// BCM pin number of each button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonPins {
    pub play_pause: u8,
    pub prev: u8,
    pub next: u8,
    pub volume_up: u8,
    pub volume_down: u8,
}

impl Default for ButtonPins {
    fn default() -> Self {
        Self {
            play_pause: 4,
            prev: 27,
            next: 17,
            volume_up: 23,
            volume_down: 24,
        }
    }
}

impl ButtonPins {
    pub fn pin(&self, code: ButtonCode) -> u8 {
        match code {
            ButtonCode::PlayPause => self.play_pause,
            ButtonCode::Prev => self.prev,
            ButtonCode::Next => self.next,
            ButtonCode::VolumeUp => self.volume_up,
            ButtonCode::VolumeDown => self.volume_down,
        }
    }

    pub fn code(&self, pin: u8) -> Option<ButtonCode> {
        ButtonCode::ALL.into_iter().find(|code| self.pin(*code) == pin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSettings {
    pub name: String,
    pub buttons: Vec<ButtonCode>,
    pub action: HiddenAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub width: usize,
    pub scroll_step_ms: u64,
    pub scroll_separator: String,
    pub pause_poll_ms: u64,
    pub idle_refresh_ms: u64,
    pub overlay_ms: u64,
    pub network_info_ms: u64,
    pub welcome: [String; 2],
    pub farewell: [String; 2],
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 16,
            scroll_step_ms: 200,
            scroll_separator: "   ".to_string(),
            pause_poll_ms: 50,
            idle_refresh_ms: 1000,
            overlay_ms: 1500,
            network_info_ms: 4000,
            welcome: ["Jukebox".to_string(), String::new()],
            farewell: ["Jukebox".to_string(), "ausgeschaltet".to_string()],
        }
    }
}

impl DisplaySettings {
    pub fn timing(&self) -> RendererTiming {
        RendererTiming {
            scroll_step: Duration::from_millis(self.scroll_step_ms),
            pause_poll: Duration::from_millis(self.pause_poll_ms),
            idle_refresh: Duration::from_millis(self.idle_refresh_ms),
            separator: self.scroll_separator.clone(),
        }
    }

    pub fn overlay(&self) -> Duration {
        Duration::from_millis(self.overlay_ms)
    }

    pub fn network_info(&self) -> Duration {
        Duration::from_millis(self.network_info_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub step: i32,
    /// Raw volume shown as 0%.
    pub baseline: i32,
    pub scale: f64,
    pub label_up: String,
    pub label_down: String,
    /// Line 1 of the volume overlay, `{percent}` is replaced.
    pub template: String,
    /// Volume applied at startup, the backend's current volume otherwise.
    pub initial: Option<u8>,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            step: 2,
            baseline: 50,
            scale: 2.0,
            label_up: "Lauter".to_string(),
            label_down: "Leiser".to_string(),
            template: "Lautstärke: {percent}%".to_string(),
            initial: None,
        }
    }
}

impl VolumeSettings {
    /// `(raw - baseline) * scale`, clamped to 0..=100.
    pub fn display_percent(&self, raw: u8) -> u8 {
        let scaled = (i32::from(raw) - self.baseline) as f64 * self.scale;
        scaled.round().clamp(0.0, 100.0) as u8
    }

    pub fn overlay_text(&self, percent: u8) -> String {
        self.template.replace("{percent}", &percent.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RfidSettings {
    pub wait_timeout_ms: u64,
}

impl Default for RfidSettings {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 500,
        }
    }
}

impl RfidSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftSettings {
    pub interval_ms: u64,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl DriftSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleSettings {
    pub enabled: bool,
    pub shutdown_after_secs: u64,
    pub check_interval_secs: u64,
    /// Power-off command line, run by the host adapter.
    pub command: Vec<String>,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            shutdown_after_secs: 1200,
            check_interval_secs: 60,
            command: vec![
                "sudo".to_string(),
                "shutdown".to_string(),
                "-h".to_string(),
                "now".to_string(),
            ],
        }
    }
}

impl IdleSettings {
    pub fn shutdown_after(&self) -> Duration {
        Duration::from_secs(self.shutdown_after_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    pub ping: String,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            ping: "ping.mp3".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_display_percent() {
        let volume = VolumeSettings::default();
        assert_eq!(volume.display_percent(62), 24);
        assert_eq!(volume.display_percent(50), 0);
        assert_eq!(volume.display_percent(20), 0);
        assert_eq!(volume.display_percent(100), 100);
        assert_eq!(volume.overlay_text(24), "Lautstärke: 24%");
    }

    #[test]
    fn test_pins_lookup() {
        let pins = ButtonPins::default();
        assert_eq!(pins.code(27), Some(ButtonCode::Prev));
        assert_eq!(pins.pin(ButtonCode::VolumeUp), 23);
        assert_eq!(pins.code(2), None);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let yaml = r#"
display:
  width: 20
sequences:
  - name: hidden
    buttons: [next, prev]
    action: show_network_info
"#;
        let settings: JukeboxSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.display.width, 20);
        assert_eq!(settings.display.scroll_step_ms, 200);
        assert_eq!(settings.buttons.debounce_ms, 300);

        let rules = settings.sequence_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].codes, vec![ButtonCode::Next, ButtonCode::Prev]);
        assert_eq!(rules[0].action, HiddenAction::ShowNetworkInfo);
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let mut settings = JukeboxSettings::default();
        assert!(settings.validate().is_ok());
        settings.display.width = 0;
        assert!(settings.validate().is_err());
    }
}

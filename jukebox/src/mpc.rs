//! Playback backend driving MPD through the `mpc` command line client.

use std::process::Command;

use tracing::trace;

use jukecontrol::{JukeboxError, PlaybackStatus, PlaylistControl, TransportControl, VolumeControl};

/// Format of the current track title: the tag title, or the file name
/// when the file has no title tag.
const TITLE_FORMAT: &str = "[%title%]|[%file%]";

pub struct MpcBackend {
    program: String,
}

impl MpcBackend {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Runs `mpc args...` and returns its standard output.
    fn run(&self, args: &[&str]) -> Result<String, JukeboxError> {
        let command = args.join(" ");
        trace!(command = command.as_str(), "mpc");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| JukeboxError::BackendUnavailable(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JukeboxError::backend_command(&command, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs a command whose output is not needed.
    fn exec(&self, args: &[&str]) -> Result<(), JukeboxError> {
        let mut quiet = Vec::with_capacity(args.len() + 1);
        quiet.push("-q");
        quiet.extend_from_slice(args);
        self.run(&quiet).map(|_| ())
    }
}

/// Parses the `volume: 62%` line printed by `mpc volume`.
pub fn parse_volume(output: &str) -> Result<u8, JukeboxError> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("volume:"))
        .and_then(|rest| rest.trim().strip_suffix('%'))
        .and_then(|value| value.trim().parse::<u8>().ok())
        .ok_or_else(|| JukeboxError::backend_bad_return_value("volume", output.trim()))
}

/// First line of `mpc current`, `None` when nothing is selected.
pub fn parse_current(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

/// `mpc status` prints `[playing]` or `[paused]` on its second line
/// when a track is selected.
pub fn parse_playing(output: &str) -> bool {
    output
        .lines()
        .any(|line| line.trim_start().starts_with("[playing]"))
}

impl TransportControl for MpcBackend {
    fn play(&self) -> Result<(), JukeboxError> {
        self.exec(&["play"])
    }

    fn pause(&self) -> Result<(), JukeboxError> {
        self.exec(&["pause"])
    }

    fn stop(&self) -> Result<(), JukeboxError> {
        self.exec(&["stop"])
    }

    fn next(&self) -> Result<(), JukeboxError> {
        self.exec(&["next"])
    }

    fn prev(&self) -> Result<(), JukeboxError> {
        self.exec(&["prev"])
    }
}

impl PlaylistControl for MpcBackend {
    fn clear_playlist(&self) -> Result<(), JukeboxError> {
        self.exec(&["clear"])
    }

    fn refresh_library(&self) -> Result<(), JukeboxError> {
        self.exec(&["update", "--wait"])
    }

    fn enqueue(&self, path: &str) -> Result<(), JukeboxError> {
        self.exec(&["add", path])
    }

    fn set_repeat(&self, enabled: bool) -> Result<(), JukeboxError> {
        self.exec(&["repeat", if enabled { "on" } else { "off" }])
    }
}

impl VolumeControl for MpcBackend {
    fn volume(&self) -> Result<u8, JukeboxError> {
        parse_volume(&self.run(&["volume"])?)
    }

    fn set_volume(&self, percent: u8) -> Result<(), JukeboxError> {
        self.exec(&["volume", &percent.to_string()])
    }

    fn adjust_volume(&self, delta: i32) -> Result<(), JukeboxError> {
        self.exec(&["volume", &format!("{delta:+}")])
    }
}

impl PlaybackStatus for MpcBackend {
    fn current_track_title(&self) -> Result<Option<String>, JukeboxError> {
        Ok(parse_current(&self.run(&["current", "-f", TITLE_FORMAT])?))
    }

    fn current_track_id(&self) -> Result<Option<String>, JukeboxError> {
        Ok(parse_current(&self.run(&["current", "-f", "%position% %file%"])?))
    }

    fn is_playing(&self) -> Result<bool, JukeboxError> {
        Ok(parse_playing(&self.run(&["status"])?))
    }
}

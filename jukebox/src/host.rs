//! Sound effects and power control through external commands.

use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use jukecontrol::{JukeboxError, PowerControl, SoundEffectPlayer};

/// Plays sound files with `mpg123` without waiting for the end.
pub struct Mpg123Player {
    program: String,
}

impl Mpg123Player {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl SoundEffectPlayer for Mpg123Player {
    fn play(&self, path: &Path) {
        let child = Command::new(&self.program)
            .arg("-q")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match child {
            Ok(child) => {
                if let Err(err) = reap(child) {
                    warn!(path = %path.display(), error = %err, "Cannot watch sound player");
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "Cannot play sound"),
        }
    }
}

/// Waits for `child` on a helper thread so it does not linger as a zombie.
fn reap(mut child: Child) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    thread::Builder::new()
        .name("sound-effect".to_string())
        .spawn(move || child.wait())
}

/// Runs the configured power-off command line.
pub struct ShutdownCommand {
    argv: Vec<String>,
}

impl ShutdownCommand {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl PowerControl for ShutdownCommand {
    fn power_off(&mut self) -> Result<(), JukeboxError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(JukeboxError::Power("empty power-off command".to_string()));
        };
        info!(command = self.argv.join(" ").as_str(), "Powering off");

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| JukeboxError::Power(format!("{program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(JukeboxError::Power(format!("{program} exited with {status}")))
        }
    }
}

//! Development console standing in for the GPIO buttons, the RFID reader
//! and the LCD.
//!
//! Buttons and tags are typed on standard input, frames are printed on
//! standard output.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use jukecontrol::settings::ButtonPins;
use jukecontrol::{
    ButtonCode, DisplaySurface, EdgeCallback, EdgeSource, JukeboxError, RfidReader, RfidUid,
};

const HELP: &str = "commands: p (play/pause), n (next), b (back), + / - (volume), \
                    tag <a,b,c,d>, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Press(ButtonCode),
    Tag(Vec<u8>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match word {
        "p" | "play" => ConsoleCommand::Press(ButtonCode::PlayPause),
        "n" | "next" => ConsoleCommand::Press(ButtonCode::Next),
        "b" | "prev" => ConsoleCommand::Press(ButtonCode::Prev),
        "+" => ConsoleCommand::Press(ButtonCode::VolumeUp),
        "-" => ConsoleCommand::Press(ButtonCode::VolumeDown),
        "tag" => {
            let uid: RfidUid = rest.trim().parse().ok()?;
            ConsoleCommand::Tag(uid.bytes().to_vec())
        }
        "h" | "help" | "?" => ConsoleCommand::Help,
        "q" | "quit" | "exit" => ConsoleCommand::Quit,
        _ => return None,
    };
    Some(command)
}

type Callbacks = Arc<RwLock<HashMap<u8, EdgeCallback>>>;

/// Edge source fed by the console.
pub struct SimulatedEdges {
    callbacks: Callbacks,
}

impl EdgeSource for SimulatedEdges {
    fn on_rising_edge(&mut self, pin: u8, callback: EdgeCallback) -> Result<(), JukeboxError> {
        self.callbacks.write().insert(pin, callback);
        Ok(())
    }
}

/// RFID reader fed by the console.
pub struct ChannelReader {
    tags: Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl RfidReader for ChannelReader {
    fn wait_for_tag(&mut self, timeout: Duration) -> Result<bool, JukeboxError> {
        match self.tags.recv_timeout(timeout) {
            Ok(uid) => {
                self.pending = Some(uid);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                Err(JukeboxError::Rfid("console closed".to_string()))
            }
        }
    }

    fn read_uid(&mut self) -> Result<Option<Vec<u8>>, JukeboxError> {
        Ok(self.pending.take())
    }
}

pub struct StdinConsole {
    callbacks: Callbacks,
    tags: Sender<Vec<u8>>,
    pins: ButtonPins,
}

/// Builds the console and the simulated devices it drives.
pub fn console(pins: ButtonPins) -> (SimulatedEdges, ChannelReader, StdinConsole) {
    let callbacks: Callbacks = Arc::new(RwLock::new(HashMap::new()));
    let (tx, rx) = unbounded();
    (
        SimulatedEdges {
            callbacks: Arc::clone(&callbacks),
        },
        ChannelReader {
            tags: rx,
            pending: None,
        },
        StdinConsole {
            callbacks,
            tags: tx,
            pins,
        },
    )
}

impl StdinConsole {
    /// Reads commands until `quit` or end of input.
    pub fn run(&self) {
        println!("{HELP}");
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(ConsoleCommand::Quit) => break,
                Some(command) => self.execute(command),
                None => println!("unknown command, {HELP}"),
            }
        }
        info!("Console closed");
    }

    pub fn execute(&self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Press(code) => {
                let pin = self.pins.pin(code);
                debug!(button = code.label(), pin, "Simulated press");
                match self.callbacks.read().get(&pin) {
                    Some(callback) => callback(),
                    None => warn!(pin, "No callback bound"),
                }
            }
            ConsoleCommand::Tag(uid) => {
                if self.tags.send(uid).is_err() {
                    warn!("RFID reader is gone");
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => {}
        }
    }
}

/// LCD replacement printing every frame.
pub struct ConsoleSurface {
    enabled: bool,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for ConsoleSurface {
    fn write_two_lines(&mut self, line0: &str, line1: &str) -> Result<(), JukeboxError> {
        if !self.enabled {
            return Ok(());
        }
        let border = "-".repeat(line0.chars().count());
        let mut out = io::stdout().lock();
        writeln!(out, "+{border}+\n|{line0}|\n|{line1}|\n+{border}+")
            .map_err(|e| JukeboxError::Display(e.to_string()))
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), JukeboxError> {
        self.enabled = enabled;
        info!(enabled, "Display power");
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), JukeboxError> {
        debug!(on, "Backlight");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), JukeboxError> {
        Ok(())
    }
}

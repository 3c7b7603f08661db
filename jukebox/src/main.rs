//! Jukebox daemon.
//!
//! Drives an MPD server through `mpc`. Without GPIO and RFID hardware the
//! buttons, tags and display are simulated on the terminal.

mod console;
mod host;
mod logging;
mod mpc;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use jukeconfig::Config;
use jukecontrol::{Collaborators, Jukebox, JukeboxConfigExt, Library, LibraryStore, PowerControl};

use crate::console::ConsoleSurface;
use crate::host::{Mpg123Player, ShutdownCommand};
use crate::mpc::MpcBackend;

/// Command-line arguments for the jukebox daemon
#[derive(Parser, Debug)]
#[command(name = "jukebox")]
#[command(about = "RFID and button driven jukebox controller")]
#[command(version)]
struct Args {
    /// Configuration directory (defaults to $JUKEBOX_CONFIG, then ./.jukebox, then ~/.jukebox)
    #[arg(short, long, default_value = "")]
    config_dir: String,

    /// Directory holding the sound effects, defaults to the configuration directory
    #[arg(short, long, env = "JUKEBOX_SOUNDS")]
    sounds: Option<PathBuf>,

    /// mpc executable
    #[arg(long, default_value = "mpc", env = "JUKEBOX_MPC")]
    mpc: String,

    /// mpg123 executable
    #[arg(long, default_value = "mpg123")]
    mpg123: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load_config(&args.config_dir)?;
    logging::init_logging(&config);

    let mut settings = config.get_jukebox_settings()?;
    let library = Library::new(LibraryStore::load(&config)?)
        .context("Cannot start without a library")?;
    info!(collections = library.len(), "Library loaded");

    let sounds_dir = args.sounds.unwrap_or_else(|| PathBuf::from(config.dir()));
    settings.sounds.ping = resolve(&sounds_dir, &settings.sounds.ping)
        .to_string_lossy()
        .into_owned();

    let (mut edges, reader, console) = console::console(settings.buttons.pins);
    let power: Option<Box<dyn PowerControl>> = if settings.idle.enabled {
        Some(Box::new(ShutdownCommand::new(settings.idle.command.clone())))
    } else {
        None
    };

    let collaborators = Collaborators {
        backend: Arc::new(MpcBackend::new(&args.mpc)),
        surface: Box::new(ConsoleSurface::new()),
        reader: Box::new(reader),
        sounds: Arc::new(Mpg123Player::new(&args.mpg123)),
        power,
        network_probe: None,
    };

    let mut jukebox = Jukebox::new(settings, library, collaborators)?;
    jukebox.start(&mut edges)?;

    console.run();

    jukebox.shutdown();
    Ok(())
}

fn resolve(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

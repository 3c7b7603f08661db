//! RFID scanner worker.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::capabilities::{RfidReader, SoundEffectPlayer};
use crate::coordinator::{AfterSwitch, PlaybackCoordinator};
use crate::model::{CollectionId, RfidUid};
use crate::now_playing::NowPlaying;
use crate::worker::RunFlag;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No card answered (all-zero uid).
    Sentinel,
    /// Fewer than four bytes.
    Invalid,
    Unmapped(RfidUid),
    Switched(CollectionId),
}

pub struct RfidScanner {
    coordinator: Arc<PlaybackCoordinator>,
    now_playing: Arc<NowPlaying>,
    sounds: Arc<dyn SoundEffectPlayer>,
    ping: PathBuf,
    wait_timeout: Duration,
}

impl RfidScanner {
    pub fn new(
        coordinator: Arc<PlaybackCoordinator>,
        now_playing: Arc<NowPlaying>,
        sounds: Arc<dyn SoundEffectPlayer>,
        ping: PathBuf,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            coordinator,
            now_playing,
            sounds,
            ping,
            wait_timeout,
        }
    }

    /// Scanner loop. Reader errors are logged and the loop goes on.
    pub fn run(&self, reader: &mut dyn RfidReader, flag: &RunFlag) {
        debug!("RFID scanner started");
        while flag.is_running() {
            match reader.wait_for_tag(self.wait_timeout) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    warn!(error = %err, "RFID reader wait failed");
                    flag.sleep(self.wait_timeout);
                    continue;
                }
            }

            match reader.read_uid() {
                Ok(Some(bytes)) => {
                    self.handle_uid(&bytes);
                }
                Ok(None) => debug!("Tag left the field before being read"),
                Err(err) => {
                    warn!(error = %err, "RFID uid read failed");
                    flag.sleep(self.wait_timeout);
                }
            }
        }
        debug!("RFID scanner stopped");
    }

    /// Acts on one uid read from the reader.
    pub fn handle_uid(&self, bytes: &[u8]) -> ScanOutcome {
        let Some(uid) = RfidUid::from_bytes(bytes) else {
            warn!(len = bytes.len(), "Ignoring short RFID uid");
            return ScanOutcome::Invalid;
        };
        if uid.is_sentinel() {
            return ScanOutcome::Sentinel;
        }

        let Some(collection) = self.coordinator.library().collection_for_uid(&uid).cloned() else {
            info!(uid = %uid, "Unknown RFID tag");
            return ScanOutcome::Unmapped(uid);
        };

        info!(uid = %uid, collection = %collection, "RFID tag recognized");
        self.sounds.play(&self.ping);
        if let Err(err) = self.coordinator.switch_with(&collection, AfterSwitch::Play) {
            warn!(error = %err, "Cannot switch collection");
            self.coordinator.ensure_playing();
        }
        self.now_playing.refresh(Some(true));
        ScanOutcome::Switched(collection)
    }
}

//! Domain types shared by every component of the controller.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::JukeboxError;

/// Identifier of a collection: the directory handed to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionId(pub String);

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(value: &str) -> Self {
        CollectionId(value.to_string())
    }
}

/// Logical button codes, independent of the GPIO pin wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonCode {
    PlayPause,
    Prev,
    Next,
    VolumeDown,
    VolumeUp,
}

impl ButtonCode {
    pub const ALL: [ButtonCode; 5] = [
        ButtonCode::PlayPause,
        ButtonCode::Prev,
        ButtonCode::Next,
        ButtonCode::VolumeDown,
        ButtonCode::VolumeUp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ButtonCode::PlayPause => "PLAY_PAUSE",
            ButtonCode::Prev => "PREV",
            ButtonCode::Next => "NEXT",
            ButtonCode::VolumeDown => "VOLUME_DOWN",
            ButtonCode::VolumeUp => "VOLUME_UP",
        }
    }
}

/// Alternate actions triggered by hidden button sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenAction {
    /// Cycle to the next collection of the library.
    NextCollection,
    /// Switch the display (and its backlight) off or back on.
    ToggleDisplay,
    /// Show host name and IP address as an overlay.
    ShowNetworkInfo,
}

/// UID of an RFID tag, reduced to the four bytes printed on the tag label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RfidUid([u8; RfidUid::LEN]);

impl RfidUid {
    pub const LEN: usize = 4;

    /// Builds a uid from the bytes returned by the reader. Trailing bytes
    /// (check byte) are ignored; fewer than four bytes is not a uid.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let head = bytes.get(..Self::LEN)?;
        let mut uid = [0u8; Self::LEN];
        uid.copy_from_slice(head);
        Some(RfidUid(uid))
    }

    /// All-zero uid reported by the reader when no card answered.
    pub fn is_sentinel(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn bytes(&self) -> [u8; Self::LEN] {
        self.0
    }
}

impl fmt::Display for RfidUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a},{b},{c},{d}")
    }
}

impl FromStr for RfidUid {
    type Err = JukeboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| JukeboxError::InvalidUid(s.to_string()))?;
        if bytes.len() != Self::LEN {
            return Err(JukeboxError::InvalidUid(s.to_string()));
        }
        Self::from_bytes(&bytes).ok_or_else(|| JukeboxError::InvalidUid(s.to_string()))
    }
}

/// A collection of the library as seen by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryEntry {
    pub collection_id: CollectionId,
    pub display_title: String,
    pub rfid_uid: Option<RfidUid>,
}

impl LibraryEntry {
    pub fn new(collection_id: &str, display_title: &str, rfid_uid: Option<RfidUid>) -> Self {
        Self {
            collection_id: CollectionId::from(collection_id),
            display_title: display_title.to_string(),
            rfid_uid,
        }
    }
}

/// Immutable lookup tables built once from the loaded library.
#[derive(Debug)]
pub struct Library {
    entries: Vec<LibraryEntry>,
    by_id: HashMap<CollectionId, usize>,
    by_uid: HashMap<RfidUid, usize>,
}

impl Library {
    /// Builds the lookup tables. Duplicate ids or uids keep their first
    /// declaration.
    pub fn new(entries: Vec<LibraryEntry>) -> Result<Self, JukeboxError> {
        if entries.is_empty() {
            return Err(JukeboxError::EmptyLibrary);
        }

        let mut by_id = HashMap::new();
        let mut by_uid = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if by_id.contains_key(&entry.collection_id) {
                warn!(collection = %entry.collection_id, "Duplicate collection ignored in lookup");
            } else {
                by_id.insert(entry.collection_id.clone(), index);
            }

            if let Some(uid) = entry.rfid_uid {
                if by_uid.contains_key(&uid) {
                    warn!(
                        uid = %uid,
                        collection = %entry.collection_id,
                        "Duplicate RFID uid ignored"
                    );
                } else {
                    by_uid.insert(uid, index);
                }
            }
        }

        Ok(Self {
            entries,
            by_id,
            by_uid,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: an empty library is rejected by [`Library::new`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&LibraryEntry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &CollectionId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn title_of(&self, id: &CollectionId) -> Option<&str> {
        self.index_of(id)
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.display_title.as_str())
    }

    pub fn collection_for_uid(&self, uid: &RfidUid) -> Option<&CollectionId> {
        self.by_uid
            .get(uid)
            .and_then(|index| self.entries.get(*index))
            .map(|entry| &entry.collection_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.iter()
    }
}

/// Current track as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub title: String,
}

//! # jukecontrol - Contrôleur du jukebox
//!
//! Cœur concurrent du jukebox : boutons, lecteur RFID, afficheur deux
//! lignes et lecteur audio externe sont coordonnés par un petit nombre de
//! threads de longue durée.
//!
//! ## Composants
//!
//! - [`PlaybackCoordinator`] : état de lecture et seul émetteur de
//!   commandes vers le lecteur audio
//! - [`DisplayState`] et [`DisplayRenderer`] : tampon d'affichage,
//!   messages temporaires et défilement
//! - [`ButtonDispatcher`] : anti-rebond, séquences cachées et actions
//! - [`RfidScanner`], [`DriftObserver`], [`IdleObserver`] : threads de
//!   surveillance
//! - [`Jukebox`] : assemblage et cycle de vie
//!
//! Le matériel et le lecteur audio sont fournis par l'application à
//! travers les traits de [`capabilities`].

pub mod capabilities;
pub mod config_ext;
pub mod coordinator;
pub mod dispatch;
pub mod display;
pub mod errors;
pub mod idle;
pub mod jukebox;
pub mod model;
pub mod now_playing;
pub mod rate_limiter;
pub mod rfid;
pub mod sequence;
pub mod settings;
pub mod watcher;
pub mod worker;

pub use capabilities::{
    DisplaySurface, EdgeCallback, EdgeSource, LibraryStore, PlaybackBackend, PlaybackStatus,
    PlaylistControl, PowerControl, RfidReader, SoundEffectPlayer, TransportControl, VolumeControl,
};
pub use config_ext::JukeboxConfigExt;
pub use coordinator::{AfterSwitch, PlaybackCoordinator, PlaybackState};
pub use dispatch::{ButtonDispatcher, DispatchOutcome, DispatchTimings, NetworkProbe};
pub use display::{
    DisplayPanel, DisplayRenderer, DisplaySnapshot, DisplayState, RendererControl, RendererState,
    RendererTiming, WakeSignal,
};
pub use errors::JukeboxError;
pub use idle::{IdleCheck, IdleObserver};
pub use jukebox::{Collaborators, Jukebox};
pub use model::{ButtonCode, CollectionId, HiddenAction, Library, LibraryEntry, RfidUid, TrackInfo};
pub use now_playing::NowPlaying;
pub use rate_limiter::RateLimiter;
pub use rfid::{RfidScanner, ScanOutcome};
pub use sequence::{SequenceDetector, SequenceRule};
pub use settings::JukeboxSettings;
pub use watcher::{DriftCheck, DriftObserver};
pub use worker::RunFlag;

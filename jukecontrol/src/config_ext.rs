//! Extension pour lire la configuration du jukebox dans jukeconfig
//!
//! Ce module fournit le trait `JukeboxConfigExt` qui ajoute à
//! `jukeconfig::Config` la lecture typée de la section `jukebox` et de la
//! bibliothèque, et fait de `Config` un `LibraryStore`.

use anyhow::{Context, Result};
use jukeconfig::Config;

use crate::capabilities::LibraryStore;
use crate::errors::JukeboxError;
use crate::model::{LibraryEntry, RfidUid};
use crate::settings::JukeboxSettings;

/// Trait d'extension pour la configuration du jukebox
///
/// # Exemple
///
/// ```rust,ignore
/// use jukeconfig::Config;
/// use jukecontrol::JukeboxConfigExt;
///
/// let config = Config::load_config("")?;
/// let settings = config.get_jukebox_settings()?;
/// println!("Largeur de l'afficheur: {}", settings.display.width);
/// ```
pub trait JukeboxConfigExt {
    /// Récupère les paramètres du contrôleur
    ///
    /// Les clés absentes prennent leur valeur par défaut.
    ///
    /// # Errors
    ///
    /// Retourne une erreur si la section `jukebox` est mal formée
    fn get_jukebox_settings(&self) -> Result<JukeboxSettings>;

    /// Récupère la bibliothèque dans l'ordre de déclaration
    ///
    /// # Errors
    ///
    /// Retourne une erreur si une entrée est mal formée ou si un uid RFID
    /// n'est pas composé de quatre octets décimaux
    fn get_library_entries(&self) -> Result<Vec<LibraryEntry>>;
}

impl JukeboxConfigExt for Config {
    fn get_jukebox_settings(&self) -> Result<JukeboxSettings> {
        let settings: JukeboxSettings = self.get_section(&["jukebox"])?;
        settings.validate()?;
        Ok(settings)
    }

    fn get_library_entries(&self) -> Result<Vec<LibraryEntry>> {
        self.get_library()?
            .into_iter()
            .map(|record| {
                let uid = record
                    .uid
                    .as_deref()
                    .map(str::parse::<RfidUid>)
                    .transpose()
                    .with_context(|| format!("Invalid uid for collection {}", record.directory))?;
                Ok(LibraryEntry::new(&record.directory, &record.name, uid))
            })
            .collect()
    }
}

impl LibraryStore for Config {
    fn load(&self) -> Result<Vec<LibraryEntry>, JukeboxError> {
        self.get_library_entries()
            .map_err(|e| JukeboxError::Config(format!("{e:#}")))
    }
}

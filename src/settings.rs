//! Game settings and preferences
//!
//! Loaded once at startup into a cache that the frame loop reads
//! synchronously. Saves update the cache first; a failed write never rolls it
//! back.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, Storage, decode, encode};

fn default_true() -> bool {
    true
}

/// User preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Haptic feedback on hits
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Sound effects
    #[serde(default = "default_true")]
    pub sound: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            vibration: true,
            sound: true,
        }
    }
}

/// Settings persistence with a synchronous cache
pub struct SettingsStore<S> {
    storage: S,
    cached: GameSettings,
}

impl<S: Storage> SettingsStore<S> {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pong_settings";

    /// Store with default settings cached; call `load` to read storage
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cached: GameSettings::default(),
        }
    }

    /// Read settings from storage into the cache.
    ///
    /// Missing or unreadable data yields defaults.
    pub fn load(&mut self) -> GameSettings {
        self.cached = match self.storage.read(Self::STORAGE_KEY) {
            Ok(Some(blob)) => match decode::<GameSettings>(&blob) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("Stored settings unreadable, using defaults: {}", err);
                    GameSettings::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                GameSettings::default()
            }
            Err(err) => {
                log::warn!("Failed to load settings, using defaults: {}", err);
                GameSettings::default()
            }
        };
        self.cached
    }

    /// Last loaded or saved settings
    pub fn read_cached(&self) -> GameSettings {
        self.cached
    }

    /// Update the cache and persist. The cache keeps the new value even if
    /// the write fails.
    pub fn save(&mut self, settings: GameSettings) -> Result<(), PersistenceError> {
        self.cached = settings;
        let result =
            encode(&settings).and_then(|blob| self.storage.write(Self::STORAGE_KEY, &blob));
        match &result {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::error!("Failed to save settings: {}", err),
        }
        result
    }

    /// Restore and persist the defaults
    pub fn reset(&mut self) -> Result<(), PersistenceError> {
        self.save(GameSettings::default())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

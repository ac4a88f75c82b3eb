use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::side_capacity;

pub const SUPPORTED_BOARD_SIZES: [u8; 3] = [6, 8, 10];
pub const DEFAULT_BOARD_SIZE: u8 = 8;
pub const DEFAULT_PIECES_PER_PLAYER: u8 = 12;

pub const SETTINGS_KEY: &str = "dam-haji.settings";
pub const TUTORIAL_SEEN_KEY: &str = "dam-haji.tutorial-seen";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unsupported board size {0} (expected 6, 8 or 10)")]
    BoardSize(u8),
    #[error("{count} pieces per player do not fit a {size}x{size} board (max {max})")]
    PieceCount { count: u8, size: u8, max: usize },
    #[error("malformed settings: {0}")]
    Malformed(String),
    #[error("storage write failed: {0}")]
    Storage(String),
}

/// Rules chosen before a game starts. Stored as camelCase JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub board_size: u8,
    pub pieces_per_player: u8,
    pub mandatory_capture: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            pieces_per_player: DEFAULT_PIECES_PER_PLAYER,
            mandatory_capture: true,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !SUPPORTED_BOARD_SIZES.contains(&self.board_size) {
            return Err(SettingsError::BoardSize(self.board_size));
        }

        let max = side_capacity(self.board_size);
        if self.pieces_per_player == 0 || self.pieces_per_player as usize > max {
            return Err(SettingsError::PieceCount {
                count: self.pieces_per_player,
                size: self.board_size,
                max,
            });
        }

        Ok(())
    }

    /// Parses and validates stored settings.
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(raw).map_err(|err| SettingsError::Malformed(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(|err| SettingsError::Malformed(err.to_string()))
    }
}

/// String key-value persistence owned by the embedding application.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings and the tutorial flag, read from and written to a `KeyValueStore`.
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }

    /// Returns the stored settings, or the defaults when nothing usable is stored.
    pub fn load_settings(&self) -> GameSettings {
        let Some(raw) = self.store.get(SETTINGS_KEY) else {
            return GameSettings::default();
        };

        match GameSettings::from_json(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("ignoring stored settings: {err}");
                GameSettings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &GameSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        let raw = settings.to_json()?;
        self.store.set(SETTINGS_KEY, &raw)?;
        debug!("saved settings {raw}");
        Ok(())
    }

    pub fn tutorial_seen(&self) -> bool {
        self.store
            .get(TUTORIAL_SEEN_KEY)
            .is_some_and(|raw| raw.trim() == "true")
    }

    pub fn set_tutorial_seen(&mut self, seen: bool) -> Result<(), SettingsError> {
        self.store
            .set(TUTORIAL_SEEN_KEY, if seen { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferences_with(key: &str, raw: &str) -> Preferences {
        let mut store = MemoryStore::default();
        store.set(key, raw).unwrap();
        Preferences::new(Box::new(store))
    }

    #[test]
    fn defaults_are_8x8_with_12_pieces_and_forced_capture() {
        let settings = GameSettings::default();

        assert_eq!(settings.board_size, 8);
        assert_eq!(settings.pieces_per_player, 12);
        assert!(settings.mandatory_capture);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_odd_and_unsupported_sizes() {
        for board_size in [0, 5, 7, 12] {
            let settings = GameSettings {
                board_size,
                ..GameSettings::default()
            };
            assert_eq!(settings.validate(), Err(SettingsError::BoardSize(board_size)));
        }
    }

    #[test]
    fn validate_caps_pieces_per_side() {
        let too_many = GameSettings {
            board_size: 6,
            pieces_per_player: 9,
            mandatory_capture: false,
        };
        assert_eq!(
            too_many.validate(),
            Err(SettingsError::PieceCount {
                count: 9,
                size: 6,
                max: 6
            })
        );

        let roomy = GameSettings {
            board_size: 10,
            pieces_per_player: 20,
            mandatory_capture: false,
        };
        assert_eq!(roomy.validate(), Ok(()));
    }

    #[test]
    fn settings_json_uses_camel_case() {
        let json = GameSettings::default().to_json().unwrap();

        assert_eq!(
            json,
            r#"{"boardSize":8,"piecesPerPlayer":12,"mandatoryCapture":true}"#
        );
    }

    #[test]
    fn save_then_load_round_trips_through_store() {
        let mut prefs = Preferences::in_memory();
        let settings = GameSettings {
            board_size: 10,
            pieces_per_player: 15,
            mandatory_capture: false,
        };

        prefs.save_settings(&settings).unwrap();

        assert_eq!(prefs.load_settings(), settings);
    }

    #[test]
    fn unparsable_or_invalid_stored_settings_fall_back_to_defaults() {
        let garbage = preferences_with(SETTINGS_KEY, "{not json");
        assert_eq!(garbage.load_settings(), GameSettings::default());

        let invalid = preferences_with(
            SETTINGS_KEY,
            r#"{"boardSize":7,"piecesPerPlayer":12,"mandatoryCapture":true}"#,
        );
        assert_eq!(invalid.load_settings(), GameSettings::default());

        assert_eq!(Preferences::in_memory().load_settings(), GameSettings::default());
    }

    #[test]
    fn save_rejects_invalid_settings_without_writing() {
        let mut prefs = Preferences::in_memory();
        let bad = GameSettings {
            board_size: 8,
            pieces_per_player: 13,
            mandatory_capture: true,
        };

        assert!(prefs.save_settings(&bad).is_err());
        assert!(prefs.store.get(SETTINGS_KEY).is_none());
    }

    #[test]
    fn tutorial_flag_persists() {
        let mut prefs = Preferences::in_memory();
        assert!(!prefs.tutorial_seen());

        prefs.set_tutorial_seen(true).unwrap();
        assert!(prefs.tutorial_seen());

        assert!(!preferences_with(TUTORIAL_SEEN_KEY, "yes").tutorial_seen());
    }
}

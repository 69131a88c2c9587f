//! Session configuration.
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_CAPACITY;

/// Knobs a front end may override. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of generated worlds.
    pub world_size: usize,
    /// Slot used by the save and load actions.
    pub save_name: String,
    pub log_capacity: usize,
    /// Render tile art in `look` and on arrival.
    pub ascii_tiles: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_size: 5,
            save_name: "savegame".to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            ascii_tiles: true,
        }
    }
}

impl GameConfig {
    /// Parse a config, filling any missing field with its default.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

//! Session states and suspended confirmations.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::player::Weapon;
use crate::world::Position;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    StartMenu,
    #[default]
    Exploring,
    Combat,
    Shop,
    AskingQuestion,
    GameOver,
}

impl GameState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartMenu => "start_menu",
            Self::Exploring => "exploring",
            Self::Combat => "combat",
            Self::Shop => "shop",
            Self::AskingQuestion => "asking_question",
            Self::GameOver => "game_over",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start_menu" => Ok(Self::StartMenu),
            "exploring" => Ok(Self::Exploring),
            "combat" => Ok(Self::Combat),
            "shop" => Ok(Self::Shop),
            "asking_question" => Ok(Self::AskingQuestion),
            "game_over" => Ok(Self::GameOver),
            _ => Err(()),
        }
    }
}

/// The single confirmation a session can be waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pending {
    Move(Position),
    Weapon(Weapon),
}

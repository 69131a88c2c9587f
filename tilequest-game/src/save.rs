//! Persisted snapshot of a session.
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::combat::CombatState;
use crate::player::Player;
use crate::state::{GameState, Pending};
use crate::world::{Position, World};

/// Canonical save payload.
///
/// `explored` is stored as sorted `[x, y]` pairs. `combat` is only present
/// while a fight is in progress and `pending` only while a question is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub player: Player,
    pub world: World,
    pub pos: Position,
    #[serde(default)]
    pub explored: Vec<[usize; 2]>,
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: GameState,
    #[serde(default)]
    pub combat: Option<CombatState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Pending>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("position ({x},{y}) is outside the {width}x{height} world")]
    PositionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("player stats are inconsistent: {0}")]
    InvalidPlayer(&'static str),
    #[error("combat snapshot is inconsistent: {0}")]
    InvalidCombat(&'static str),
}

impl SaveData {
    /// Check the invariants a restored session relies on.
    ///
    /// # Errors
    ///
    /// Returns an error when the position lies off the map, or when the
    /// player's or the enemy's pools are out of range.
    pub fn validate(&self) -> Result<(), SaveError> {
        if !self.world.contains(self.pos) {
            return Err(SaveError::PositionOutOfBounds {
                x: self.pos.x,
                y: self.pos.y,
                width: self.world.width(),
                height: self.world.height(),
            });
        }
        let p = &self.player;
        if p.max_hp <= 0 || p.max_mp < 0 {
            return Err(SaveError::InvalidPlayer("maximum pools must be positive"));
        }
        if p.level < 1 {
            return Err(SaveError::InvalidPlayer("level must be at least 1"));
        }
        if !(0..=p.max_hp).contains(&p.hp) {
            return Err(SaveError::InvalidPlayer("hp must lie within 0..=max_hp"));
        }
        if !(0..=p.max_mp).contains(&p.mp) {
            return Err(SaveError::InvalidPlayer("mp must lie within 0..=max_mp"));
        }
        if let Some(combat) = &self.combat {
            let enemy = &combat.enemy;
            if enemy.max_hp <= 0 || !(0..=enemy.max_hp).contains(&enemy.hp) {
                return Err(SaveError::InvalidCombat("enemy hp must lie within 0..=max_hp"));
            }
        }
        Ok(())
    }

    /// Parse a save from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid save payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the save as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn lenient_state<'de, D>(deserializer: D) -> Result<GameState, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_tileset;
    use crate::enemy::Enemy;

    fn sample() -> SaveData {
        let world = World::generate_random(5, &default_tileset(), Some(42)).unwrap();
        SaveData {
            player: Player::new_hero(),
            pos: world.center(),
            world,
            explored: vec![[2, 2]],
            state: GameState::Exploring,
            combat: None,
            pending: None,
        }
    }

    #[test]
    fn json_roundtrip_is_lossless() {
        let save = sample();
        let json = save.to_json().unwrap();
        assert_eq!(SaveData::from_json(&json).unwrap(), save);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"], "exploring");
        assert!(value["combat"].is_null());
        assert!(value.get("pending").is_none());
        assert_eq!(value["player"]["weapon"]["attack_bonus"], 2);
        assert_eq!(value["world"]["grid"][2][2]["name"], "Oakheart Village");
    }

    #[test]
    fn unknown_state_falls_back_to_exploring() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["state"] = serde_json::Value::String("dancing".to_string());
        let save: SaveData = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(save.state, GameState::Exploring);
        value.as_object_mut().unwrap().remove("state");
        let save: SaveData = serde_json::from_value(value).unwrap();
        assert_eq!(save.state, GameState::Exploring);
    }

    #[test]
    fn validate_rejects_off_map_position() {
        let mut save = sample();
        assert!(save.validate().is_ok());
        save.pos = Position::new(9, 0);
        assert!(matches!(
            save.validate(),
            Err(SaveError::PositionOutOfBounds { x: 9, .. })
        ));
        let mut broken = sample();
        broken.player.level = 0;
        assert!(matches!(broken.validate(), Err(SaveError::InvalidPlayer(_))));
    }

    #[test]
    fn validate_rejects_pools_outside_their_bounds() {
        let mut overfull = sample();
        overfull.player.hp = 999;
        assert!(matches!(overfull.validate(), Err(SaveError::InvalidPlayer(_))));

        let mut drained = sample();
        drained.player.mp = -1;
        assert!(matches!(drained.validate(), Err(SaveError::InvalidPlayer(_))));

        let mut surplus = sample();
        surplus.player.mp = surplus.player.max_mp + 1;
        assert!(matches!(surplus.validate(), Err(SaveError::InvalidPlayer(_))));

        let mut fallen = sample();
        fallen.player.hp = 0;
        assert!(fallen.validate().is_ok());
    }

    #[test]
    fn validate_rejects_enemy_hp_above_its_maximum() {
        let mut save = sample();
        let mut enemy = Enemy {
            name: "Slime (Lv 1)".to_string(),
            ascii: "slime.txt".to_string(),
            level: 1,
            max_hp: 12,
            hp: 12,
            attack: 3,
            defense: 0,
            xp_reward: 15,
            gold_reward: 5,
        };
        save.state = GameState::Combat;
        save.combat = Some(CombatState::new(enemy.clone()));
        assert!(save.validate().is_ok());

        enemy.hp = 40;
        save.combat = Some(CombatState::new(enemy));
        assert!(matches!(save.validate(), Err(SaveError::InvalidCombat(_))));
    }

    #[test]
    fn malformed_payloads_fail_to_parse() {
        assert!(SaveData::from_json("{\"player\": 3}").is_err());
        assert!(SaveData::from_json("not json").is_err());
    }
}

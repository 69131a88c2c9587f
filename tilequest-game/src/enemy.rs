//! Enemy archetypes and per-encounter scaling.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_ARCHETYPE_POOL, DEFAULT_BASE_ATTACK, DEFAULT_ENEMY_ASCII, ENEMY_LEVEL_CAP_OVER_PLAYER,
    ENEMY_LEVEL_JITTER,
};
use crate::world::Position;

fn default_base_attack() -> i32 {
    DEFAULT_BASE_ATTACK
}

fn default_ascii() -> String {
    DEFAULT_ENEMY_ASCII.to_string()
}

/// Enemy template, ordered from weakest to strongest in the content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub name: String,
    pub base_hp: i32,
    #[serde(default = "default_base_attack")]
    pub base_attack: i32,
    #[serde(default)]
    pub base_defense: i32,
    #[serde(default)]
    pub xp_reward: i32,
    #[serde(default)]
    pub gold_reward: i32,
    #[serde(default = "default_ascii")]
    pub ascii: String,
}

/// A live opponent created for a single encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub ascii: String,
    pub level: i32,
    pub max_hp: i32,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp_reward: i32,
    pub gold_reward: i32,
}

impl Enemy {
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
    }
}

/// Roll an enemy scaled to the player's level and the depth of `pos`.
///
/// Deeper tiles unlock more of the archetype list and push the enemy level
/// up, capped at three levels above the player. Returns `None` when there
/// are no archetypes to pick from.
pub fn generate_enemy<R: Rng + ?Sized>(
    archetypes: &[EnemyArchetype],
    player_level: i32,
    pos: Position,
    rng: &mut R,
) -> Option<Enemy> {
    let depth = pos.depth();
    let available = &archetypes[..(BASE_ARCHETYPE_POOL + depth).min(archetypes.len())];
    let archetype = available.choose(rng)?;

    let jitter = ENEMY_LEVEL_JITTER.choose(rng).copied().unwrap_or(0);
    let half_depth = i32::try_from(depth / 2).unwrap_or(i32::MAX);
    let level = (player_level + jitter)
        .saturating_add(half_depth)
        .min(player_level + ENEMY_LEVEL_CAP_OVER_PLAYER)
        .max(1);

    let max_hp = archetype.base_hp + level * 3 + rng.gen_range(0..=3);
    let attack = archetype.base_attack + level + rng.gen_range(0..=2);
    let defense = archetype.base_defense + level / 3;
    let xp_reward = archetype.xp_reward + level * 10 + rng.gen_range(0..=10);
    let gold_reward = archetype.gold_reward + level * 3 + rng.gen_range(0..=6);

    log::debug!("generated {} at level {level} (depth {depth})", archetype.name);
    Some(Enemy {
        name: format!("{} (Lv {level})", archetype.name),
        ascii: archetype.ascii.clone(),
        level,
        max_hp,
        hp: max_hp,
        attack,
        defense,
        xp_reward,
        gold_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_archetypes;
    use crate::rng::RngBundle;

    #[test]
    fn empty_archetypes_yield_none() {
        let mut rng = RngBundle::from_user_seed(1);
        assert!(generate_enemy(&[], 1, Position::new(0, 0), rng.encounter()).is_none());
    }

    #[test]
    fn shallow_tiles_only_use_the_weakest_archetypes() {
        let archetypes = default_archetypes();
        let allowed: Vec<&str> = archetypes[..3].iter().map(|a| a.name.as_str()).collect();
        let mut rng = RngBundle::from_user_seed(4);
        for _ in 0..100 {
            let enemy =
                generate_enemy(&archetypes, 1, Position::new(0, 0), rng.encounter()).unwrap();
            assert!(
                allowed.iter().any(|name| enemy.name.starts_with(name)),
                "{}",
                enemy.name
            );
        }
    }

    #[test]
    fn level_is_bounded() {
        let archetypes = default_archetypes();
        let mut rng = RngBundle::from_user_seed(8);
        for _ in 0..200 {
            let deep =
                generate_enemy(&archetypes, 2, Position::new(9, 9), rng.encounter()).unwrap();
            assert!(deep.level <= 5);
            assert!(deep.name.ends_with(&format!("(Lv {})", deep.level)));
            let shallow =
                generate_enemy(&archetypes, 1, Position::new(0, 0), rng.encounter()).unwrap();
            assert!((1..=2).contains(&shallow.level));
        }
    }

    #[test]
    fn stats_follow_the_archetype() {
        let archetype = EnemyArchetype {
            name: "Dummy".to_string(),
            base_hp: 10,
            base_attack: 3,
            base_defense: 1,
            xp_reward: 5,
            gold_reward: 2,
            ascii: "(o_o)".to_string(),
        };
        let mut rng = RngBundle::from_user_seed(12);
        let enemy = generate_enemy(&[archetype], 1, Position::new(0, 0), rng.encounter()).unwrap();
        let lvl = enemy.level;
        assert!((10 + lvl * 3..=13 + lvl * 3).contains(&enemy.max_hp));
        assert_eq!(enemy.hp, enemy.max_hp);
        assert!((3 + lvl..=5 + lvl).contains(&enemy.attack));
        assert_eq!(enemy.defense, 1 + lvl / 3);
        assert!((5 + lvl * 10..=15 + lvl * 10).contains(&enemy.xp_reward));
        assert!((2 + lvl * 3..=8 + lvl * 3).contains(&enemy.gold_reward));
        assert_eq!(enemy.ascii, "(o_o)");
    }

    #[test]
    fn archetype_defaults_fill_missing_fields() {
        let archetype: EnemyArchetype =
            serde_json::from_str(r#"{"name":"Blob","base_hp":4}"#).unwrap();
        assert_eq!(archetype.base_attack, 3);
        assert_eq!(archetype.ascii, "???");
    }
}

//! Player stats, gear and leveling.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{XP_CURVE_BASE, XP_CURVE_FACTOR};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub attack_bonus: i32,
}

impl Weapon {
    #[must_use]
    pub fn new(name: &str, attack_bonus: i32) -> Self {
        Self {
            name: name.to_string(),
            attack_bonus,
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ATK +{})", self.name, self.attack_bonus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    pub defense_bonus: i32,
}

impl Armor {
    #[must_use]
    pub fn new(name: &str, defense_bonus: i32) -> Self {
        Self {
            name: name.to_string(),
            defense_bonus,
        }
    }
}

impl fmt::Display for Armor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (DEF +{})", self.name, self.defense_bonus)
    }
}

const WEAPON_TIERS: [(&str, i32); 6] = [
    ("Rusty Dagger", 1),
    ("Wooden Sword", 2),
    ("Iron Sword", 3),
    ("Steel Axe", 4),
    ("Knight's Blade", 5),
    ("Runed Spear", 6),
];

const ARMOR_TIERS: [(&str, i32); 5] = [
    ("Cloth Armor", 1),
    ("Leather Armor", 2),
    ("Chain Mail", 3),
    ("Scale Mail", 4),
    ("Plate Armor", 5),
];

/// Every weapon that can drop, be found, or be sold, weakest first.
#[must_use]
pub fn weapon_pool() -> Vec<Weapon> {
    WEAPON_TIERS
        .iter()
        .map(|(name, bonus)| Weapon::new(name, *bonus))
        .collect()
}

/// Every armor the merchants carry, weakest first.
#[must_use]
pub fn armor_pool() -> Vec<Armor> {
    ARMOR_TIERS
        .iter()
        .map(|(name, bonus)| Armor::new(name, *bonus))
        .collect()
}

/// Pick a weapon biased towards the player's level.
///
/// The tier index centers on `(level - 1) / 2` with a jitter of one step in
/// either direction, then a neighbour of that tier is chosen.
pub fn random_weapon_for_level<R: Rng + ?Sized>(level: i32, rng: &mut R) -> Weapon {
    let pool = weapon_pool();
    let last = pool.len() - 1;
    let center = (level - 1).max(0) / 2 + rng.gen_range(-1..=1);
    let idx = usize::try_from(center.max(0)).unwrap_or(0).min(last);
    let window = &pool[idx.saturating_sub(1)..(idx + 2).min(pool.len())];
    window
        .choose(rng)
        .or_else(|| pool.first())
        .cloned()
        .unwrap_or_else(|| Weapon::new(WEAPON_TIERS[0].0, WEAPON_TIERS[0].1))
}

/// XP needed to advance from `level` to the next one.
#[must_use]
pub const fn xp_to_next_level(level: i32) -> i32 {
    XP_CURVE_BASE + level * level * XP_CURVE_FACTOR
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: i32,
    pub xp: i32,
    pub gold: i32,
    pub max_hp: i32,
    pub hp: i32,
    pub max_mp: i32,
    pub mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub potions: i32,
    #[serde(default)]
    pub known_spells: Vec<String>,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub armor: Option<Armor>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new_hero()
    }
}

impl Player {
    /// Starting character for a fresh adventure.
    #[must_use]
    pub fn new_hero() -> Self {
        Self {
            name: "Hero".to_string(),
            level: 1,
            xp: 0,
            gold: 50,
            max_hp: 20,
            hp: 20,
            max_mp: 10,
            mp: 10,
            attack: 5,
            defense: 2,
            potions: 1,
            known_spells: Vec::new(),
            weapon: Some(Weapon::new("Wooden Sword", 2)),
            armor: Some(Armor::new("Cloth Armor", 1)),
        }
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    #[must_use]
    pub fn total_attack(&self) -> i32 {
        self.attack + self.weapon.as_ref().map_or(0, |w| w.attack_bonus)
    }

    #[must_use]
    pub fn total_defense(&self) -> i32 {
        self.defense + self.armor.as_ref().map_or(0, |a| a.defense_bonus)
    }

    /// Restore HP up to the cap. Returns the HP actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.hp;
        self.hp = (self.hp + amount).clamp(0, self.max_hp);
        self.hp - old
    }

    /// Restore MP up to the cap. Returns the MP actually gained.
    pub fn restore_mp(&mut self, amount: i32) -> i32 {
        let old = self.mp;
        self.mp = (self.mp + amount).clamp(0, self.max_mp);
        self.mp - old
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
    }

    /// Spend MP if enough is available.
    pub fn spend_mp(&mut self, cost: i32) -> bool {
        if self.mp < cost {
            return false;
        }
        self.mp -= cost;
        true
    }

    #[must_use]
    pub fn knows_spell(&self, spell: &str) -> bool {
        self.known_spells.iter().any(|known| known == spell)
    }

    /// Grant XP and resolve any number of level-ups, carrying excess XP over.
    ///
    /// Returns one note for the XP gain followed by one per level reached.
    pub fn add_xp(&mut self, amount: i32) -> Vec<String> {
        let mut notes = vec![format!("You gain {amount} XP.")];
        self.xp += amount;
        while self.xp >= xp_to_next_level(self.level) {
            self.xp -= xp_to_next_level(self.level);
            self.level += 1;
            let hp_gain = 5 + self.level;
            let atk_gain = 1 + self.level / 3;
            let def_gain = i32::from(self.level % 2 == 0);
            self.max_hp += hp_gain;
            self.attack += atk_gain;
            self.defense += def_gain;
            self.hp = self.max_hp;
            notes.push(format!(
                "Level up! You are now level {}. +{hp_gain} HP, +{atk_gain} ATK, +{def_gain} DEF. HP fully restored!",
                self.level
            ));
        }
        notes
    }
}

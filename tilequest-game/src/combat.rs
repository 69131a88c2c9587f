//! Spell table, damage formulas and transient combat counters.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{FLEE_CHANCE, FLEE_CHANCE_STRONG_ENEMY};
use crate::enemy::Enemy;
use crate::player::Player;

/// What a spell does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellEffect {
    Damage,
    Heal,
    Regen,
    GuardBreak,
    /// Damage with a chance to stun.
    Stun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spell {
    pub name: &'static str,
    pub mp: i32,
    pub power: i32,
    pub effect: SpellEffect,
    pub description: &'static str,
}

pub const SPELLS: [Spell; 6] = [
    Spell {
        name: "Firebolt",
        mp: 4,
        power: 6,
        effect: SpellEffect::Damage,
        description: "Hurl a bolt of fire at your foe.",
    },
    Spell {
        name: "Heal",
        mp: 5,
        power: 10,
        effect: SpellEffect::Heal,
        description: "Mend your wounds.",
    },
    Spell {
        name: "Ice Shard",
        mp: 7,
        power: 9,
        effect: SpellEffect::Damage,
        description: "A piercing lance of ice.",
    },
    Spell {
        name: "Shock",
        mp: 6,
        power: 5,
        effect: SpellEffect::Stun,
        description: "A jolt of lightning that may stun.",
    },
    Spell {
        name: "Regen",
        mp: 5,
        power: 3,
        effect: SpellEffect::Regen,
        description: "Recover a little HP over several turns.",
    },
    Spell {
        name: "Guard Break",
        mp: 4,
        power: 2,
        effect: SpellEffect::GuardBreak,
        description: "Weaken the enemy's defenses for a short time.",
    },
];

/// Exact-name lookup.
#[must_use]
pub fn spell(name: &str) -> Option<&'static Spell> {
    SPELLS.iter().find(|spell| spell.name == name)
}

/// Case-insensitive lookup used when resolving typed input and action ids.
#[must_use]
pub fn spell_by_key(key: &str) -> Option<&'static Spell> {
    SPELLS
        .iter()
        .find(|spell| spell.name.eq_ignore_ascii_case(key.trim()))
}

/// Physical damage. Never less than one.
pub fn calc_damage<R: Rng + ?Sized>(attack: i32, defense: i32, rng: &mut R) -> i32 {
    (attack - defense + rng.gen_range(-1..=2)).max(1)
}

/// Damage from an offensive spell. Never less than one.
pub fn spell_damage<R: Rng + ?Sized>(
    power: i32,
    caster_level: i32,
    enemy_defense: i32,
    rng: &mut R,
) -> i32 {
    (power + caster_level / 2 + rng.gen_range(0..=2) - enemy_defense / 4).max(1)
}

#[must_use]
pub fn flee_chance(player: &Player, enemy: &Enemy) -> f64 {
    if enemy.level > player.level {
        FLEE_CHANCE_STRONG_ENEMY
    } else {
        FLEE_CHANCE
    }
}

/// Active encounter: the enemy plus status counters that expire with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub enemy: Enemy,
    #[serde(default)]
    pub regen_turns: i32,
    #[serde(default)]
    pub regen_amount: i32,
    #[serde(default)]
    pub enemy_stunned: i32,
    #[serde(default)]
    pub enemy_def_down: i32,
    #[serde(default)]
    pub enemy_def_turns: i32,
}

impl CombatState {
    #[must_use]
    pub const fn new(enemy: Enemy) -> Self {
        Self {
            enemy,
            regen_turns: 0,
            regen_amount: 0,
            enemy_stunned: 0,
            enemy_def_down: 0,
            enemy_def_turns: 0,
        }
    }

    /// Enemy defense after any active guard break.
    #[must_use]
    pub fn effective_defense(&self) -> i32 {
        let down = if self.enemy_def_turns > 0 {
            self.enemy_def_down
        } else {
            0
        };
        (self.enemy.defense - down).max(0)
    }

    /// Count down the guard break. Returns true when the debuff just expired.
    pub fn tick_def_down(&mut self) -> bool {
        if self.enemy_def_turns <= 0 {
            return false;
        }
        self.enemy_def_turns -= 1;
        if self.enemy_def_turns == 0 && self.enemy_def_down > 0 {
            self.enemy_def_down = 0;
            return true;
        }
        false
    }

    /// Apply one regen charge. Returns the HP restored when a charge was used.
    pub fn tick_regen(&mut self, player: &mut Player) -> Option<i32> {
        if self.regen_turns > 0 && self.regen_amount > 0 {
            self.regen_turns -= 1;
            return Some(player.heal(self.regen_amount));
        }
        None
    }

    /// Consume a stun charge if the enemy is stunned.
    pub fn consume_stun(&mut self) -> bool {
        if self.enemy_stunned > 0 {
            self.enemy_stunned -= 1;
            return true;
        }
        false
    }
}

use rand::Rng;
use serde_json::json;

use super::Game;
use crate::ascii::{hp_line, render_enemy};
use crate::combat::{CombatState, SpellEffect, calc_damage, flee_chance, spell, spell_damage};
use crate::constants::{
    GUARD_BREAK_TURNS, POTION_HEAL_BASE, REGEN_TURNS, SHOCK_STUN_CHANCE, SHOCK_STUN_TURNS,
    WEAPON_DROP_CHANCE,
};
use crate::enemy::Enemy;
use crate::error::ActionError;
use crate::events::EventKind;
use crate::player::random_weapon_for_level;
use crate::state::GameState;

impl Game {
    /// Start a fight and return the encounter intro.
    pub(crate) fn enter_combat(&mut self, enemy: Enemy) -> String {
        log::debug!(
            "encounter: {} (hp {}, atk {}, def {}) at {}",
            enemy.name,
            enemy.hp,
            enemy.attack,
            enemy.defense,
            self.session.pos
        );
        self.events.emit(
            EventKind::EnteredCombat,
            json!({ "position": self.session.pos, "enemy": enemy }),
        );
        let combat = CombatState::new(enemy);
        let intro = format!(
            "A {} appears! Prepare for battle.\n{}",
            combat.enemy.name,
            self.status_text(&combat)
        );
        self.session.combat = Some(combat);
        self.change_state(GameState::Combat);
        intro
    }

    pub(crate) fn combat_status(&self) -> Result<String, ActionError> {
        let combat = self
            .session
            .combat
            .as_ref()
            .ok_or(ActionError::NoActiveCombat)?;
        Ok(self.status_text(combat))
    }

    fn status_text(&self, combat: &CombatState) -> String {
        let player = &self.session.player;
        let enemy = &combat.enemy;
        [
            format!(
                "{} | MP {}/{}",
                hp_line("You", player.hp, player.max_hp),
                player.mp,
                player.max_mp
            ),
            hp_line(&enemy.name, enemy.hp, enemy.max_hp),
            format!("\n{}\n", render_enemy(&enemy.ascii, self.services.art())),
            format!(
                "[Enemy Stats] ATK: {} | DEF: {}",
                enemy.attack,
                combat.effective_defense()
            ),
        ]
        .join("\n")
    }

    pub(crate) fn combat_attack(&mut self) -> Result<String, ActionError> {
        let attack = self.session.player.total_attack();
        let combat = self
            .session
            .combat
            .as_mut()
            .ok_or(ActionError::NoActiveCombat)?;
        let damage = calc_damage(attack, combat.effective_defense(), self.rng.combat());
        combat.enemy.take_damage(damage);
        self.events.emit(
            EventKind::Attacked,
            json!({
                "enemy_name": combat.enemy.name,
                "damage": damage,
                "enemy_hp": combat.enemy.hp,
            }),
        );
        let note = format!("You strike the {} for {damage} damage.", combat.enemy.name);
        if !combat.enemy.is_alive() {
            return Ok(format!("{note}\n{}", self.end_combat(true)));
        }
        self.finish_round(note)
    }

    pub(crate) fn combat_cast(&mut self, name: &str) -> Result<String, ActionError> {
        if self.session.combat.is_none() {
            return Ok("You can't cast that now.".to_string());
        }
        let player = &mut self.session.player;
        let Some(spell) = spell(name).filter(|_| player.knows_spell(name)) else {
            return Ok("You don't know that spell.".to_string());
        };
        if !player.spend_mp(spell.mp) {
            self.events.emit(
                EventKind::OutOfMana,
                json!({ "spell": spell.name, "required_mp": spell.mp, "current_mp": player.mp }),
            );
            return Ok("Not enough MP!".to_string());
        }
        let level = player.level;
        let combat = self
            .session
            .combat
            .as_mut()
            .ok_or(ActionError::NoActiveCombat)?;

        let mut note = match spell.effect {
            SpellEffect::Heal => {
                let healed = player.heal(spell.power + level);
                self.events.emit(
                    EventKind::CastSpell,
                    json!({
                        "spell": spell.name,
                        "type": "heal",
                        "healed": healed,
                        "player_mp": player.mp,
                    }),
                );
                format!("You cast Heal and restore {healed} HP.")
            }
            SpellEffect::Regen => {
                combat.regen_turns = REGEN_TURNS;
                combat.regen_amount = spell.power;
                self.events.emit(
                    EventKind::CastSpell,
                    json!({
                        "spell": spell.name,
                        "type": "regen",
                        "regen_amount": spell.power,
                        "regen_turns": REGEN_TURNS,
                        "player_mp": player.mp,
                    }),
                );
                format!(
                    "You cast Regen. You'll recover {} HP for {REGEN_TURNS} turns.",
                    spell.power
                )
            }
            SpellEffect::GuardBreak => {
                combat.enemy_def_down = spell.power + level / 4;
                combat.enemy_def_turns = GUARD_BREAK_TURNS;
                self.events.emit(
                    EventKind::CastSpell,
                    json!({
                        "spell": spell.name,
                        "type": "debuff",
                        "defense_down": combat.enemy_def_down,
                        "defense_turns": combat.enemy_def_turns,
                        "player_mp": player.mp,
                    }),
                );
                "You cast Guard Break! The enemy's defenses falter.".to_string()
            }
            SpellEffect::Damage | SpellEffect::Stun => {
                let damage =
                    spell_damage(spell.power, level, combat.enemy.defense, self.rng.combat());
                combat.enemy.take_damage(damage);
                self.events.emit(
                    EventKind::CastSpell,
                    json!({
                        "spell": spell.name,
                        "type": "damage",
                        "damage": damage,
                        "enemy_hp": combat.enemy.hp,
                        "player_mp": player.mp,
                    }),
                );
                let note = format!(
                    "You cast {}! It hits {} for {damage} damage.",
                    spell.name, combat.enemy.name
                );
                if !combat.enemy.is_alive() {
                    return Ok(format!("{note}\n{}", self.end_combat(true)));
                }
                note
            }
        };
        if spell.effect == SpellEffect::Stun
            && self.rng.combat().r#gen::<f64>() < SHOCK_STUN_CHANCE
        {
            combat.enemy_stunned = SHOCK_STUN_TURNS;
            note.push_str(&format!("\n{} is stunned!", combat.enemy.name));
        }
        self.finish_round(note)
    }

    pub(crate) fn combat_potion(&mut self) -> Result<String, ActionError> {
        if self.session.combat.is_none() {
            return Ok("You don't need to use a potion now.".to_string());
        }
        let player = &mut self.session.player;
        if player.potions <= 0 {
            return Ok("You have no potions.".to_string());
        }
        player.potions -= 1;
        let healed = player.heal(POTION_HEAL_BASE + player.level);
        self.events.emit(
            EventKind::UsedPotion,
            json!({ "healed": healed, "potions_left": player.potions, "player_hp": player.hp }),
        );
        self.finish_round(format!("You quaff a potion and recover {healed} HP."))
    }

    pub(crate) fn combat_flee(&mut self) -> Result<String, ActionError> {
        let Some(combat) = self.session.combat.as_ref() else {
            return Ok("There is nothing to flee from.".to_string());
        };
        let chance = flee_chance(&self.session.player, &combat.enemy);
        let enemy_name = combat.enemy.name.clone();
        if self.rng.combat().r#gen::<f64>() < chance {
            self.session.combat = None;
            self.change_state(GameState::Exploring);
            self.events.emit(
                EventKind::ExitedCombat,
                json!({ "victory": false, "fled": true, "enemy_name": enemy_name }),
            );
            return Ok("You successfully flee back to safety.".to_string());
        }
        self.events
            .emit(EventKind::FailedFlee, json!({ "enemy_name": enemy_name }));
        self.finish_round("You fail to flee!".to_string())
    }

    /// Let the enemy answer the player's move, then show the status if the
    /// fight goes on.
    fn finish_round(&mut self, note: String) -> Result<String, ActionError> {
        let mut out = note;
        out.push('\n');
        out.push_str(&self.enemy_turn()?);
        if let Some(combat) = self.session.combat.as_ref() {
            out.push('\n');
            out.push_str(&self.status_text(combat));
        }
        Ok(out)
    }

    fn enemy_turn(&mut self) -> Result<String, ActionError> {
        let combat = self
            .session
            .combat
            .as_mut()
            .ok_or(ActionError::NoActiveCombat)?;
        let player = &mut self.session.player;
        let mut lines = Vec::new();
        if combat.consume_stun() {
            self.events.emit(
                EventKind::EnemyStunned,
                json!({ "enemy_name": combat.enemy.name, "turns_left": combat.enemy_stunned }),
            );
            lines.push(format!("{} is stunned and cannot act!", combat.enemy.name));
        } else {
            let damage = calc_damage(
                combat.enemy.attack,
                player.total_defense(),
                self.rng.combat(),
            );
            player.take_damage(damage);
            self.events.emit(
                EventKind::EnemyAttacked,
                json!({
                    "enemy_name": combat.enemy.name,
                    "damage": damage,
                    "player_hp": player.hp,
                }),
            );
            lines.push(format!(
                "{} strikes you for {damage} damage.",
                combat.enemy.name
            ));
        }
        if combat.tick_def_down() {
            self.events.emit(
                EventKind::EnemyRecovered,
                json!({ "enemy_name": combat.enemy.name, "effect": "defense_recovered" }),
            );
            lines.push("The enemy's defenses recover.".to_string());
        }
        if let Some(restored) = combat.tick_regen(player) {
            self.events.emit(
                EventKind::Regen,
                json!({ "healed": restored, "turns_left": combat.regen_turns }),
            );
            lines.push(format!("Regen restores {restored} HP."));
        }
        if !player.is_alive() {
            lines.push(self.end_combat(false));
        }
        Ok(lines.join("\n"))
    }

    /// Settle the fight and pick the follow-up state.
    fn end_combat(&mut self, victory: bool) -> String {
        let combat = self.session.combat.take();
        let mut lines = Vec::new();
        let mut spoils = None;
        if victory {
            if let Some(CombatState { enemy, .. }) = combat {
                let player = &mut self.session.player;
                let level_before = player.level;
                player.gold += enemy.gold_reward;
                lines.push(format!(
                    "You defeated {}! You loot {} gold.",
                    enemy.name, enemy.gold_reward
                ));
                lines.extend(player.add_xp(enemy.xp_reward));
                self.events.emit(
                    EventKind::ExitedCombat,
                    json!({
                        "victory": true,
                        "fled": false,
                        "enemy_name": enemy.name,
                        "gold_looted": enemy.gold_reward,
                        "xp_gained": enemy.xp_reward,
                        "leveled_up": player.level > level_before,
                    }),
                );
                for level in (level_before + 1)..=player.level {
                    self.events.emit(EventKind::LevelUp, json!({ "level": level }));
                }
                if self.rng.loot().r#gen::<f64>() < WEAPON_DROP_CHANCE {
                    let found = random_weapon_for_level(player.level, self.rng.loot());
                    spoils = Some((found, format!("the fallen {}", enemy.name)));
                }
                log::debug!("victory over {} at {}", enemy.name, self.session.pos);
            }
        } else {
            let enemy_name = combat.map(|combat| combat.enemy.name);
            self.events.emit(
                EventKind::ExitedCombat,
                json!({ "victory": false, "fled": false, "enemy_name": enemy_name }),
            );
            lines.push("You were defeated...".to_string());
            log::debug!("defeated at {}", self.session.pos);
        }

        if !self.session.player.is_alive() {
            self.change_state(GameState::GameOver);
        } else if let Some((found, source)) = spoils {
            lines.push(self.offer_weapon(found, &source));
        } else {
            self.change_state(GameState::Exploring);
        }
        lines.join("\n")
    }
}

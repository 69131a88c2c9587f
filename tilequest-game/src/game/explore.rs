use rand::Rng;
use serde_json::json;

use super::Game;
use crate::ascii::render_room;
use crate::constants::{
    AMBUSH_BASE, AMBUSH_CAP, DANGER_WARNING_THRESHOLD, FIELD_FIND_SAFE, FIELD_FIND_WILD,
    VILLAGE_POTION_GIFT_CHANCE, VILLAGE_REST_BASE, VILLAGE_REST_PER_LEVEL, WILD_REST_BASE,
};
use crate::enemy::generate_enemy;
use crate::error::ActionError;
use crate::events::EventKind;
use crate::player::{Weapon, random_weapon_for_level};
use crate::state::{GameState, Pending};
use crate::store::{Purchase, Shop};
use crate::weather::effect_of;
use crate::world::{Position, Tile};

const MERCHANT_HINT: &str = "You see a merchant here (type shop to enter).";

pub(crate) fn danger_question(tile: &Tile) -> String {
    format!(
        "Warning: '{}' seems very dangerous (danger {:.2}). Proceed? [y/N]",
        tile.name, tile.danger
    )
}

pub(crate) fn weapon_question(found: &Weapon, current: Option<&Weapon>, source: &str) -> String {
    let mut question = format!(
        "You find {} (ATK +{}) from {source}.",
        found.name, found.attack_bonus
    );
    let current_bonus = match current {
        Some(weapon) => {
            question.push_str(&format!(
                "\nCurrent: {} (ATK +{}).",
                weapon.name, weapon.attack_bonus
            ));
            weapon.attack_bonus
        }
        None => {
            question.push_str("\nYou have no weapon equipped.");
            0
        }
    };
    let verdict = match found.attack_bonus.cmp(&current_bonus) {
        std::cmp::Ordering::Greater => "better",
        std::cmp::Ordering::Equal => "the same",
        std::cmp::Ordering::Less => "worse",
    };
    question.push_str(&format!("\nIt seems {verdict}. Take it? [y/N]"));
    question
}

impl Game {
    /// Step by a delta, clamped to the map.
    ///
    /// With `ask` set, stepping onto a dangerous unsafe tile suspends into a
    /// yes/no question instead of moving.
    pub(crate) fn move_by(&mut self, dx: i32, dy: i32, ask: bool) -> Result<String, ActionError> {
        let from = self.session.pos;
        self.log
            .add_entry(format!("Attempting to move from {from} by delta ({dx},{dy})"));
        self.events.emit(
            EventKind::AttemptMove,
            json!({ "from": from, "delta": [dx, dy] }),
        );
        let target = self.session.world.clamp_step(from, dx, dy);
        if target == from {
            self.events.emit(
                EventKind::CantMove,
                json!({ "reason": "edge_of_world", "from": from, "to": target }),
            );
            return Ok("You can't go that way.".to_string());
        }

        let weather = self
            .session
            .world
            .reroll_weather(target, self.rng.weather());
        log::debug!("weather at {target} is now {weather}");
        let dest = self
            .session
            .world
            .tile(target)
            .ok_or(ActionError::MissingTile(target))?;
        self.events.emit(
            EventKind::WeatherChanged,
            json!({ "position": target, "tile_name": dest.name, "weather": weather.to_string() }),
        );
        if ask && !dest.safe && dest.danger >= DANGER_WARNING_THRESHOLD {
            self.events.emit(
                EventKind::DangerWarning,
                json!({
                    "position": target,
                    "tile_name": dest.name,
                    "danger": dest.danger,
                    "weather": weather.to_string(),
                }),
            );
            let question = danger_question(dest);
            self.session.pending = Some(Pending::Move(target));
            self.session.question.clone_from(&question);
            self.change_state(GameState::AskingQuestion);
            return Ok(question);
        }
        self.change_state(GameState::Exploring);

        let origin_weather = self.session.world.weather_at(from);
        let stuck_chance = effect_of(origin_weather).stuck_chance();
        let stuck = stuck_chance > 0.0 && self.rng.encounter().r#gen::<f64>() < stuck_chance;
        let mut desc = if stuck {
            let blocker = origin_weather.map_or("The weather is unusual.", |w| w.stuck_message());
            log::debug!("stuck at {from} moving to {target}");
            self.events.emit(
                EventKind::CantMove,
                json!({ "reason": "stuck_weather", "from": from, "to": target }),
            );
            format!("{blocker} You can't move this turn!")
        } else {
            self.session.pos = target;
            self.session.rested = false;
            self.session.explored.insert(target);
            let tile = self
                .session
                .world
                .tile(target)
                .ok_or(ActionError::MissingTile(target))?;
            self.events.emit(
                EventKind::Moved,
                json!({ "from": from, "to": target, "tile_name": tile.name }),
            );
            if tile.shop {
                self.events.emit(
                    EventKind::FoundShop,
                    json!({ "position": target, "tile_name": tile.name }),
                );
            }
            let mut desc = format!(
                "{}\nYou arrive at {}. {}",
                self.tile_art(tile),
                tile.name,
                tile.description
            );
            if tile.shop {
                desc.push('\n');
                desc.push_str(MERCHANT_HINT);
            }
            desc
        };

        let tile = self.current_tile()?.clone();
        let here = self.session.pos;
        let effect = effect_of(self.session.world.weather_at(here));
        if !tile.safe
            && self.rng.encounter().r#gen::<f64>() < tile.danger + effect.encounter_rate
            && let Some(intro) = self.spawn_encounter(here)
        {
            desc.push_str("\n\n");
            desc.push_str(&intro);
            return Ok(desc);
        }

        let base = if tile.safe {
            FIELD_FIND_SAFE
        } else {
            FIELD_FIND_WILD
        };
        if self.rng.loot().r#gen::<f64>() < base * effect.visibility {
            let found = random_weapon_for_level(self.session.player.level, self.rng.loot());
            desc.push_str("\n\n");
            desc.push_str(&self.offer_weapon(found, "the area"));
        }
        Ok(desc)
    }

    /// Roll an enemy for `pos` and start the fight. `None` when the content
    /// has no archetypes.
    fn spawn_encounter(&mut self, pos: Position) -> Option<String> {
        let enemy = generate_enemy(
            &self.content.archetypes,
            self.session.player.level,
            pos,
            self.rng.encounter(),
        );
        let Some(enemy) = enemy else {
            log::warn!("encounter rolled at {pos} but no enemy archetypes are loaded");
            return None;
        };
        Some(self.enter_combat(enemy))
    }

    /// Suspend on a yes/no question about picking up `found`.
    pub(crate) fn offer_weapon(&mut self, found: Weapon, source: &str) -> String {
        let question = weapon_question(&found, self.session.player.weapon.as_ref(), source);
        self.events.emit(
            EventKind::FoundWeapon,
            json!({ "position": self.session.pos, "weapon": found, "source": source }),
        );
        self.session.pending = Some(Pending::Weapon(found));
        self.session.question.clone_from(&question);
        self.change_state(GameState::AskingQuestion);
        question
    }

    pub(crate) fn answer_question(&mut self, yes: bool) -> Result<String, ActionError> {
        if self.session.state != GameState::AskingQuestion {
            return Ok("No question pending.".to_string());
        }
        let Some(pending) = self.session.pending.take() else {
            return Ok("No question pending.".to_string());
        };
        self.session.question.clear();
        self.change_state(GameState::Exploring);
        match pending {
            Pending::Move(target) if yes => {
                let from = self.session.pos;
                let dx = axis_delta(from.x, target.x);
                let dy = axis_delta(from.y, target.y);
                self.move_by(dx, dy, false)
            }
            Pending::Move(_) => {
                self.events.emit(
                    EventKind::CantMove,
                    json!({ "reason": "move_declined", "from": self.session.pos }),
                );
                Ok("You decide not to proceed there.".to_string())
            }
            Pending::Weapon(weapon) if yes => {
                let message = format!("You equip the {}.", weapon.name);
                self.events
                    .emit(EventKind::PickedUpWeapon, json!({ "weapon": weapon }));
                self.session.player.weapon = Some(weapon);
                Ok(message)
            }
            Pending::Weapon(weapon) => {
                self.events.emit(EventKind::LeftWeapon, json!({ "weapon": weapon }));
                Ok("You leave the weapon behind.".to_string())
            }
        }
    }

    /// Rest once per tile visit. Safe tiles heal more and may gift a potion;
    /// wild tiles risk an ambush.
    pub(crate) fn rest(&mut self) -> Result<String, ActionError> {
        let tile = self.current_tile()?.clone();
        let here = self.session.pos;
        if self.session.rested {
            self.events.emit(
                EventKind::CantRest,
                json!({ "position": here, "tile_name": tile.name }),
            );
            return Ok("You have already rested here. Try moving to another location.".to_string());
        }
        self.session.rested = true;
        let level = self.session.player.level;
        if tile.safe {
            let healed = self
                .session
                .player
                .heal(VILLAGE_REST_BASE + level * VILLAGE_REST_PER_LEVEL);
            let gifted = self.rng.loot().r#gen::<f64>() < VILLAGE_POTION_GIFT_CHANCE;
            self.events.emit(
                EventKind::Rested,
                json!({ "kind": "village_rest", "healed": healed, "received_potion": gifted }),
            );
            if gifted {
                self.session.player.potions += 1;
                return Ok(format!(
                    "You rest at the village and heal {healed} HP. The healer gifts you a potion."
                ));
            }
            return Ok(format!("You rest at the village and heal {healed} HP."));
        }

        let healed = self.session.player.heal(WILD_REST_BASE + level);
        let mut note = format!("You rest cautiously and heal {healed} HP.");
        self.events.emit(
            EventKind::Rested,
            json!({ "kind": "wild_rest", "healed": healed }),
        );
        let ambush = (AMBUSH_BASE + tile.danger / 2.0).min(AMBUSH_CAP);
        if self.rng.encounter().r#gen::<f64>() < ambush
            && let Some(intro) = self.spawn_encounter(here)
        {
            let enemy_name = self
                .session
                .combat
                .as_ref()
                .map(|combat| combat.enemy.name.clone());
            self.events.emit(
                EventKind::RestInterrupted,
                json!({ "position": here, "enemy_name": enemy_name }),
            );
            note.push_str("\nYou are ambushed in your sleep!\n\n");
            note.push_str(&intro);
        }
        Ok(note)
    }

    pub(crate) fn shop_enter(&mut self) -> Result<String, ActionError> {
        if !self.current_tile()?.shop {
            return Ok("There is no shop here.".to_string());
        }
        let listing = self.shop_listing();
        self.change_state(GameState::Shop);
        self.events
            .emit(EventKind::EnteredShop, json!({ "position": self.session.pos }));
        Ok(format!("You enter the shop!\n{listing}"))
    }

    /// Listing for the merchant on the current tile, stocking it if needed.
    pub(crate) fn shop_listing(&mut self) -> String {
        let pos = self.session.pos;
        let player = &self.session.player;
        let rng = &mut self.rng;
        let shop = self
            .session
            .shops
            .entry(pos)
            .or_insert_with(|| Shop::generate(player, rng.loot()));
        shop.prune(player);
        shop.listing(player)
    }

    pub(crate) fn shop_buy(&mut self, selection: &str) -> Result<String, ActionError> {
        let pos = self.session.pos;
        let Some(shop) = self.session.shops.get_mut(&pos) else {
            return Ok("There is no shop here.".to_string());
        };
        let purchase = shop.buy(selection, &mut self.session.player);
        log::debug!("shop at {pos}: {purchase:?}");
        let gold = self.session.player.gold;
        match &purchase {
            Purchase::Bought(item) => self.events.emit(
                EventKind::BoughtItem,
                json!({ "item": item, "gold_left": gold }),
            ),
            Purchase::NotStocked => self.events.emit(
                EventKind::ShopItemNotFound,
                json!({ "selection": selection }),
            ),
            Purchase::NotEnoughGold => self.events.emit(
                EventKind::ShopNotEnoughGold,
                json!({ "selection": selection, "gold": gold }),
            ),
        }
        Ok(purchase.message())
    }

    pub(crate) fn shop_exit(&mut self) -> Result<String, ActionError> {
        self.change_state(GameState::Exploring);
        self.events
            .emit(EventKind::ExitedShop, json!({ "position": self.session.pos }));
        Ok(format!("You leave the shop.\n{}", self.look()?))
    }

    pub(crate) fn inventory(&self) -> String {
        let player = &self.session.player;
        format!("Inventory: Potions x{}; Gold {}", player.potions, player.gold)
    }

    pub(crate) fn tile_art(&self, tile: &Tile) -> String {
        if self.config.ascii_tiles {
            render_room(tile, self.services.art())
        } else {
            String::new()
        }
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn axis_delta(from: usize, to: usize) -> i32 {
    to as i32 - from as i32
}

use super::Game;
use crate::combat::spell;
use crate::error::ActionError;
use crate::player::xp_to_next_level;
use crate::state::GameState;
use crate::weather;
use crate::world::Position;

impl Game {
    /// Describe whatever the player is currently facing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is inconsistent, e.g. in combat with
    /// no enemy or standing off the map.
    pub fn look(&self) -> Result<String, ActionError> {
        match self.session.state {
            GameState::Combat => return self.combat_status(),
            GameState::Shop => {
                let player = &self.session.player;
                return Ok(self
                    .session
                    .shops
                    .get(&self.session.pos)
                    .map_or_else(
                        || "There is no shop here.".to_string(),
                        |shop| shop.listing(player),
                    ));
            }
            GameState::AskingQuestion => return Ok(self.session.question.clone()),
            GameState::GameOver => {
                return Ok("Game Over. You can load a saved game or restart.".to_string());
            }
            GameState::StartMenu => {
                return Ok("Welcome to Tilequest! Start a new game, load a save, or quit.".to_string());
            }
            GameState::Exploring => {}
        }

        let tile = self.current_tile()?;
        let weather = weather::describe(self.session.world.weather_at(self.session.pos));
        let mut out = format!(
            "{}\nCurrent weather: {weather}\n{}: {}",
            self.tile_art(tile),
            tile.name,
            tile.description
        );
        if tile.shop {
            out.push_str("\nYou see a merchant here (type shop to enter).");
        }
        Ok(out)
    }

    /// ASCII map: `@` player, `$` discovered merchant, `.` explored, `?` unknown.
    #[must_use]
    pub fn map(&self) -> String {
        let world = &self.session.world;
        let rows: Vec<String> = (0..world.height())
            .map(|y| {
                (0..world.width())
                    .map(|x| {
                        let pos = Position::new(x, y);
                        if pos == self.session.pos {
                            '@'
                        } else if !self.session.explored.contains(&pos) {
                            '?'
                        } else if world.tile(pos).is_some_and(|tile| tile.shop) {
                            '$'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect();
        format!(
            "Map ({}x{})\n@ you, . explored, $ shop, ? unknown\n\n{}",
            world.width(),
            world.height(),
            rows.join("\n")
        )
    }

    /// Character sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the player stands off the map.
    pub fn stats(&self) -> Result<String, ActionError> {
        let p = &self.session.player;
        let tile = self.current_tile()?;
        let known_in_table = p.known_spells.iter().filter(|s| spell(s).is_some()).count();
        let weapon = p.weapon.as_ref().map_or_else(|| "None".to_string(), ToString::to_string);
        let armor = p.armor.as_ref().map_or_else(|| "None".to_string(), ToString::to_string);
        let spells = if p.known_spells.is_empty() {
            "None".to_string()
        } else {
            p.known_spells.join(", ")
        };
        Ok(format!(
            "Stats for {}:\nLv {}\nXP: {}/{} | Gold: {}\n\
             HP: {}/{} | MP: {}/{} | ATK: {} | DEF: {} | Potions: {} | Spells: {known_in_table}\n\
             Weapon: {weapon}\nArmor: {armor}\nSpells Known: {spells}\n\
             Location: {} - {}\nState: {}",
            p.name,
            p.level,
            p.xp,
            xp_to_next_level(p.level),
            p.gold,
            p.hp,
            p.max_hp,
            p.mp,
            p.max_mp,
            p.attack,
            p.defense,
            p.potions,
            self.session.pos,
            tile.name,
            self.session.state,
        ))
    }

    #[must_use]
    pub fn spells(&self) -> String {
        let known = &self.session.player.known_spells;
        if known.is_empty() {
            return "Known Spells: You know no spells.".to_string();
        }
        let mut lines = vec!["Known Spells:".to_string()];
        lines.extend(known.iter().map(|name| match spell(name) {
            Some(s) => format!(" - {} (MP {}) [pow {}]: {}", s.name, s.mp, s.power, s.description),
            None => format!(" - {name}: (Unknown spell details)"),
        }));
        lines.join("\n")
    }

    #[must_use]
    pub fn help_text(&self) -> String {
        let mut lines = vec!["Available actions:".to_string()];
        for action in self.available_actions() {
            let hotkeys = if action.hotkeys.is_empty() {
                String::new()
            } else {
                format!(" [{}]", action.hotkeys.join(", "))
            };
            let disabled = if action.enabled { "" } else { " (disabled)" };
            let reason = action
                .reason
                .as_deref()
                .filter(|_| !action.enabled)
                .map(|r| format!(" - {r}"))
                .unwrap_or_default();
            lines.push(format!("  - {}{hotkeys}{disabled}{reason}", action.label));
        }
        lines.join("\n")
    }

    #[must_use]
    pub fn get_log(&self) -> String {
        self.log.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::game::tests::seeded_game;
    use crate::state::GameState;
    use crate::world::Position;

    #[test]
    fn look_describes_the_village() {
        let (game, _) = seeded_game(42);
        let out = game.look().unwrap();
        assert!(out.contains("Current weather: The weather is indescribable."));
        assert!(out.contains("Oakheart Village: "), "{out}");
        assert!(out.contains("| Oakheart Village"), "placeholder art is boxed: {out}");
    }

    #[test]
    fn look_follows_the_state() {
        let (mut game, _) = seeded_game(42);
        game.change_state(GameState::GameOver);
        assert_eq!(
            game.look().unwrap(),
            "Game Over. You can load a saved game or restart."
        );
        game.change_state(GameState::StartMenu);
        assert!(game.look().unwrap().starts_with("Welcome to Tilequest!"));
    }

    #[test]
    fn map_marks_player_explored_and_shops() {
        let (mut game, _) = seeded_game(42);
        let shop = game.world().shop_positions()[0];
        game.session.explored.insert(shop);
        game.session.explored.insert(Position::new(0, 0));
        let map = game.map();
        let rows: Vec<&str> = map.lines().skip(3).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].chars().nth(2), Some('@'));
        assert_eq!(rows[shop.y].chars().nth(shop.x), Some('$'));
        if shop != Position::new(0, 0) {
            assert_eq!(rows[0].chars().next(), Some('.'));
        }
        assert!(map.starts_with("Map (5x5)\n@ you, . explored, $ shop, ? unknown\n\n"));
        assert_eq!(map.matches('?').count(), 25 - game.explored().len() + 1);
    }

    #[test]
    fn stats_sheet_lists_gear_and_location() {
        let (game, _) = seeded_game(42);
        let out = game.stats().unwrap();
        assert!(out.starts_with("Stats for Hero:\nLv 1\nXP: 0/75 | Gold: 50\n"));
        assert!(out.contains("Weapon: Wooden Sword (ATK +2)"));
        assert!(out.contains("Armor: Cloth Armor (DEF +1)"));
        assert!(out.contains("Spells Known: None"));
        assert!(out.contains("Location: (2,2) - Oakheart Village"));
        assert!(out.ends_with("State: exploring"));
    }

    #[test]
    fn spell_list() {
        let (mut game, _) = seeded_game(42);
        assert_eq!(game.spells(), "Known Spells: You know no spells.");
        game.player_mut().known_spells.push("Firebolt".to_string());
        assert_eq!(
            game.spells(),
            "Known Spells:\n - Firebolt (MP 4) [pow 6]: Hurl a bolt of fire at your foe."
        );
    }

    #[test]
    fn help_lists_disabled_reasons() {
        let (game, _) = seeded_game(42);
        let help = game.help_text();
        assert!(help.starts_with("Available actions:\n"));
        assert!(help.contains("  - Shop [shop] (disabled) - No merchant here"));
        assert!(help.contains("  - Save Game [save, !]"));
    }
}

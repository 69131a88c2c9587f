use std::collections::BTreeSet;

use rand::Rng;

use super::explore::{danger_question, weapon_question};
use super::{Game, Session};
use crate::constants::{WORLD_SEED_MAX, WORLD_SEED_MIN};
use crate::error::ActionError;
use crate::save::{SaveData, SaveError};
use crate::state::{GameState, Pending};
use crate::world::{Position, World};

impl Game {
    /// Snapshot the session in the canonical save shape.
    #[must_use]
    pub fn to_save(&self) -> SaveData {
        let session = &self.session;
        SaveData {
            player: session.player.clone(),
            world: session.world.clone(),
            pos: session.pos,
            explored: session.explored.iter().map(|p| [p.x, p.y]).collect(),
            state: session.state,
            combat: session
                .combat
                .clone()
                .filter(|_| session.state == GameState::Combat),
            pending: session
                .pending
                .clone()
                .filter(|_| session.state == GameState::AskingQuestion),
        }
    }

    /// Replace the session with a saved one.
    ///
    /// Explored cells off the map are dropped, and a combat or question
    /// state whose payload is missing falls back to exploring. Merchant
    /// stock and the rest marker start fresh.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the session untouched, when the save fails
    /// validation.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_save(&mut self, data: SaveData) -> Result<(), SaveError> {
        data.validate()?;
        let SaveData {
            player,
            world,
            pos,
            explored,
            state,
            combat,
            pending,
        } = data;

        let mut explored: BTreeSet<Position> = explored
            .into_iter()
            .map(|[x, y]| Position::new(x, y))
            .filter(|p| world.contains(*p))
            .collect();
        explored.insert(pos);

        let combat = combat.filter(|_| state == GameState::Combat);
        let pending = pending.filter(|_| state == GameState::AskingQuestion);
        let question = pending
            .as_ref()
            .and_then(|pending| match pending {
                Pending::Move(target) => world.tile(*target).map(danger_question),
                Pending::Weapon(found) => {
                    Some(weapon_question(found, player.weapon.as_ref(), "the area"))
                }
            })
            .unwrap_or_default();
        let state = match state {
            GameState::Combat if combat.is_none() => GameState::Exploring,
            GameState::AskingQuestion if question.is_empty() => GameState::Exploring,
            other => other,
        };

        let mut session = Session::fresh(world);
        session.player = player;
        session.pos = pos;
        session.state = state;
        session.combat = combat;
        session.explored = explored;
        session.pending = pending.filter(|_| state == GameState::AskingQuestion);
        session.question = question;
        self.session = session;

        if state == GameState::Shop && self.current_tile().is_ok_and(|tile| tile.shop) {
            self.shop_listing();
            self.change_state(state);
        } else if state == GameState::Shop {
            self.change_state(GameState::Exploring);
        } else {
            self.change_state(state);
        }
        Ok(())
    }

    pub(crate) fn save_game(&mut self) -> Result<String, ActionError> {
        let data = self.to_save();
        self.services
            .storage()
            .save(&self.config.save_name, &data)
            .map_err(|source| ActionError::Storage(source.into()))?;
        log::info!("saved session to '{}'", self.config.save_name);
        Ok("Game saved.".to_string())
    }

    /// Restore the configured save slot. Missing or rejected saves leave the
    /// session as it was.
    pub(crate) fn load_game(&mut self) -> String {
        let slot = self.config.save_name.clone();
        let outcome = match self.services.storage().load(&slot) {
            Ok(Some(data)) => self.from_save(data).map_err(anyhow::Error::new),
            Ok(None) => Err(anyhow::anyhow!("no save in slot '{slot}'")),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => {
                log::info!("loaded session from '{slot}'");
                "Game loaded.".to_string()
            }
            Err(err) => {
                log::warn!("load rejected: {err:#}");
                "No save found or save file invalid.".to_string()
            }
        }
    }

    pub(crate) fn restart_game(&mut self) -> Result<String, ActionError> {
        self.fresh_world()?;
        Ok(format!("Game restarted.\n{}", self.look()?))
    }

    pub(crate) fn start_new_game(&mut self) -> Result<String, ActionError> {
        self.fresh_world()?;
        Ok(format!("A new adventure begins!\n{}", self.look()?))
    }

    /// Swap in a new world of the same size and a new hero.
    fn fresh_world(&mut self) -> Result<(), ActionError> {
        let size = self.session.world.size();
        let seed = self.rng.loot().gen_range(WORLD_SEED_MIN..WORLD_SEED_MAX);
        let world = World::generate_random(size, &self.content.tileset, Some(seed))?;
        log::info!("fresh {size}x{size} world, seed {seed}");
        self.session = Session::fresh(world);
        self.change_state(GameState::Exploring);
        Ok(())
    }

    pub(crate) fn quit_game(&mut self) -> String {
        self.ended = true;
        "Game ended by player.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::enemy::Enemy;
    use crate::error::ActionError;
    use crate::game::tests::seeded_game;
    use crate::player::Weapon;
    use crate::save::SaveData;
    use crate::state::{GameState, Pending};
    use crate::world::Position;
    use crate::{GameStorage, NoArt, Services};

    fn brute() -> Enemy {
        Enemy {
            name: "Bandit (Lv 2)".to_string(),
            ascii: "bandit.txt".to_string(),
            level: 2,
            max_hp: 30,
            hp: 21,
            attack: 6,
            defense: 2,
            xp_reward: 30,
            gold_reward: 12,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let (mut game, storage) = seeded_game(42);
        game.player_mut().gold = 99;
        game.session.explored.insert(Position::new(4, 4));
        assert_eq!(game.execute_action("save").as_deref(), Some("Game saved."));
        let saved = storage.saves.borrow().get("savegame").cloned().unwrap();
        assert_eq!(saved.explored, vec![[2, 2], [4, 4]]);

        game.player_mut().gold = 0;
        game.change_state(GameState::GameOver);
        assert_eq!(game.execute_action("load").as_deref(), Some("Game loaded."));
        assert_eq!(game.player().gold, 99);
        assert_eq!(game.state(), GameState::Exploring);
        assert_eq!(game.to_save(), saved);
    }

    #[test]
    fn missing_save_leaves_session_alone() {
        let (mut game, _) = seeded_game(42);
        game.change_state(GameState::GameOver);
        assert_eq!(
            game.execute_action("game_over_load").as_deref(),
            Some("No save found or save file invalid.")
        );
        assert_eq!(game.state(), GameState::GameOver);
    }

    #[test]
    fn invalid_save_is_rejected() {
        let (mut game, storage) = seeded_game(42);
        let mut bad = game.to_save();
        bad.pos = Position::new(9, 9);
        storage.saves.borrow_mut().insert("savegame".to_string(), bad);
        game.player_mut().gold = 3;
        game.change_state(GameState::GameOver);
        assert_eq!(
            game.execute_action("l").as_deref(),
            Some("No save found or save file invalid.")
        );
        assert_eq!(game.player().gold, 3);
    }

    #[test]
    fn overfull_pools_are_rejected_on_load() {
        let (mut game, storage) = seeded_game(42);
        let mut bad = game.to_save();
        bad.player.hp = 999;
        bad.player.mp = 500;
        storage.saves.borrow_mut().insert("savegame".to_string(), bad);
        game.player_mut().hp = 7;
        game.change_state(GameState::GameOver);
        assert_eq!(
            game.execute_action("load").as_deref(),
            Some("No save found or save file invalid.")
        );
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.player().hp, 7);
        assert_eq!(game.player().mp, game.player().max_mp);

        game.change_state(GameState::Exploring);
        let rest = game.execute_action("rest").unwrap();
        assert!(rest.starts_with("You rest at the village and heal 10 HP."), "{rest}");
    }

    #[test]
    fn combat_snapshot_round_trips() {
        let (mut game, _) = seeded_game(8);
        game.enter_combat(brute());
        game.session.combat.as_mut().unwrap().enemy_def_turns = 1;
        let snapshot = game.to_save();
        assert!(snapshot.combat.is_some());

        let (mut other, _) = seeded_game(9);
        other.from_save(snapshot.clone()).unwrap();
        assert_eq!(other.state(), GameState::Combat);
        assert_eq!(other.combat().unwrap().enemy.hp, 21);
        assert_eq!(other.to_save(), snapshot);
    }

    #[test]
    fn pending_question_round_trips() {
        let (mut game, _) = seeded_game(8);
        let question = game.offer_weapon(Weapon::new("Battle Axe", 5), "the area");
        let snapshot = game.to_save();
        assert_eq!(snapshot.pending, Some(Pending::Weapon(Weapon::new("Battle Axe", 5))));

        let (mut other, _) = seeded_game(1);
        other.from_save(snapshot).unwrap();
        assert_eq!(other.state(), GameState::AskingQuestion);
        assert_eq!(other.look().unwrap(), question);
        assert_eq!(other.execute_action("y").as_deref(), Some("You equip the Battle Axe."));
    }

    #[test]
    fn payload_without_combat_falls_back_to_exploring() {
        let (mut game, _) = seeded_game(8);
        let mut data = game.to_save();
        data.state = GameState::Combat;
        data.explored.push([70, 70]);
        game.from_save(data).unwrap();
        assert_eq!(game.state(), GameState::Exploring);
        assert!(!game.explored().contains(&Position::new(70, 70)));
    }

    #[test]
    fn restart_draws_a_new_world_of_the_same_size() {
        let (mut game, _) = seeded_game(8);
        game.player_mut().gold = 1;
        game.change_state(GameState::GameOver);
        let out = game.execute_action("restart").unwrap();
        assert!(out.starts_with("Game restarted.\n"));
        assert_eq!(game.world().width(), 5);
        assert_eq!(game.player().gold, 50);
        assert_eq!(game.position(), Position::new(2, 2));
        assert_eq!(game.state(), GameState::Exploring);
        let seed = game.world().seed().unwrap();
        assert!((1..10_000_000).contains(&seed));
    }

    #[test]
    fn quit_marks_the_session_ended() {
        let (mut game, _) = seeded_game(8);
        assert!(!game.is_ended());
        assert_eq!(game.execute_action("q").as_deref(), Some("Game ended by player."));
        assert!(game.is_ended());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    struct FullDisk;

    impl GameStorage for FullDisk {
        type Error = DiskFull;

        fn save_game(&self, _save_name: &str, _save: &SaveData) -> Result<(), Self::Error> {
            Err(DiskFull)
        }

        fn load_game(&self, _save_name: &str) -> Result<Option<SaveData>, Self::Error> {
            Err(DiskFull)
        }

        fn delete_save(&self, _save_name: &str) -> Result<(), Self::Error> {
            Err(DiskFull)
        }
    }

    #[test]
    fn storage_faults_are_typed_and_generic_to_the_player() {
        let (game, _) = seeded_game(8);
        let mut game = crate::game::Game::new(
            Services::new(FullDisk, NoArt),
            game.content.clone(),
            game.config.clone(),
            game.session.world.clone(),
            crate::rng::RngBundle::from_user_seed(8),
        );
        let failure = game.try_execute_action("save").unwrap_err();
        assert_eq!(failure.id, "save_game");
        assert!(matches!(failure.cause, ActionError::Storage(_)));
        assert_eq!(
            game.execute_action("save").as_deref(),
            Some("Action 'save_game' failed.")
        );
        assert_eq!(
            game.execute_action("start_load_game").as_deref(),
            Some("You can't do that right now.")
        );
    }
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use tilequest_game::{
    Content, EmbeddedData, Game, GameConfig, GameEngine, GameStorage, NoArt, RngBundle, SaveData,
    Services, Tile, World,
};

/// Save slots kept in memory and shared between handles.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub saves: Rc<RefCell<HashMap<String, SaveData>>>,
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn save_game(&self, save_name: &str, save: &SaveData) -> Result<(), Self::Error> {
        self.saves
            .borrow_mut()
            .insert(save_name.to_string(), save.clone());
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<SaveData>, Self::Error> {
        Ok(self.saves.borrow().get(save_name).cloned())
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(save_name);
        Ok(())
    }
}

/// Seeded game on the embedded content, plus a handle on its save slots.
pub fn seeded_game(seed: u64) -> (Game, MemoryStorage) {
    let storage = MemoryStorage::default();
    let engine = GameEngine::new(EmbeddedData, GameConfig::default());
    let game = engine
        .new_game(Services::new(storage.clone(), NoArt), Some(seed))
        .expect("embedded content builds a world");
    (game, storage)
}

pub fn tile(name: &str, danger: f64, safe: bool) -> Tile {
    Tile {
        name: name.to_string(),
        description: format!("{name} lies before you."),
        danger,
        safe,
        ascii: None,
        shop: false,
    }
}

/// 3x3 world of quiet meadows around a village, with `north` above it.
pub fn game_with_north(north: Tile, seed: u64) -> (Game, MemoryStorage) {
    let meadow = tile("Meadow", 0.0, true);
    let mut grid = vec![vec![meadow; 3]; 3];
    grid[1][1] = tile("Village", 0.0, true);
    grid[0][1] = north;
    let world = World::from_grid(3, 3, grid, Some(seed)).expect("3x3 grid");
    let storage = MemoryStorage::default();
    let game = Game::new(
        Services::new(storage.clone(), NoArt),
        Content::default(),
        GameConfig::default(),
        world,
        RngBundle::from_user_seed(seed),
    );
    (game, storage)
}

//! Tilequest Game Engine
//!
//! Platform-agnostic core of a turn-based text adventure: a seeded tile
//! world, turn-based combat, merchants, leveling and save/load, all driven
//! through a per-state action catalog. No rendering or I/O lives here; front
//! ends inject content, art and storage through the traits below.

pub mod actions;
pub mod ascii;
pub mod combat;
pub mod config;
pub(crate) mod constants;
pub mod data;
pub mod enemy;
pub mod error;
pub mod events;
pub mod game;
pub mod game_log;
pub mod player;
pub mod rng;
pub mod save;
pub mod state;
pub mod store;
pub mod weather;
pub mod world;

// Re-export commonly used types
pub use actions::{Action, ActionCatalog, ActionCategory, ActionKind, Direction};
pub use combat::{CombatState, SPELLS, Spell, SpellEffect};
pub use config::GameConfig;
pub use data::{ARCHETYPE_RESOURCE, Content, EmbeddedData, TILESET_RESOURCE};
pub use enemy::{Enemy, EnemyArchetype, generate_enemy};
pub use error::{ActionError, ActionFailure, EngineError};
pub use events::{EventKind, EventQueue, GameEvent};
pub use game::Game;
pub use game_log::GameLog;
pub use player::{Armor, Player, Weapon, xp_to_next_level};
pub use rng::RngBundle;
pub use save::{SaveData, SaveError};
pub use state::{GameState, Pending};
pub use store::{ItemKind, Shop, ShopItem};
pub use weather::{Weather, WeatherEffect};
pub use world::{Position, Tile, TileTemplate, Tileset, World, WorldError};

/// Trait for abstracting content loading
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the enemy archetype list
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read or parsed.
    fn load_archetypes(&self, resource: &str) -> Result<Vec<EnemyArchetype>, Self::Error>;

    /// Load the tileset used for world generation
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read or parsed.
    fn load_tileset(&self, resource: &str) -> Result<Tileset, Self::Error>;
}

/// Source of text art, looked up by file name.
pub trait AsciiLoader {
    /// Art for `name`, or `None` when there is none.
    fn load_art(&self, name: &str) -> Option<String>;
}

/// Art loader that never finds anything; every lookup uses the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArt;

impl AsciiLoader for NoArt {
    fn load_art(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_game(&self, save_name: &str, save: &SaveData) -> Result<(), Self::Error>;

    /// Load a snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the save exists but cannot be read or parsed.
    fn load_game(&self, save_name: &str) -> Result<Option<SaveData>, Self::Error>;

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Object-safe view of [`GameStorage`] with the error type erased.
pub(crate) trait DynStorage {
    fn save(&self, save_name: &str, save: &SaveData) -> anyhow::Result<()>;
    fn load(&self, save_name: &str) -> anyhow::Result<Option<SaveData>>;
}

impl<S: GameStorage> DynStorage for S {
    fn save(&self, save_name: &str, save: &SaveData) -> anyhow::Result<()> {
        self.save_game(save_name, save).map_err(anyhow::Error::new)
    }

    fn load(&self, save_name: &str) -> anyhow::Result<Option<SaveData>> {
        self.load_game(save_name).map_err(anyhow::Error::new)
    }
}

/// Collaborators a running game calls back into.
pub struct Services {
    storage: Box<dyn DynStorage>,
    art: Box<dyn AsciiLoader>,
}

impl Services {
    pub fn new<S, A>(storage: S, art: A) -> Self
    where
        S: GameStorage + 'static,
        A: AsciiLoader + 'static,
    {
        Self {
            storage: Box::new(storage),
            art: Box::new(art),
        }
    }

    pub(crate) fn storage(&self) -> &dyn DynStorage {
        self.storage.as_ref()
    }

    pub(crate) fn art(&self) -> &dyn AsciiLoader {
        self.art.as_ref()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Main game engine for creating and resuming sessions
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
    config: GameConfig,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine with the provided data loader and config
    pub const fn new(data_loader: L, config: GameConfig) -> Self {
        Self {
            data_loader,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Load the tileset and enemy archetypes.
    ///
    /// # Errors
    ///
    /// Returns an error if either resource cannot be loaded.
    pub fn content(&self) -> Result<Content, EngineError> {
        let tileset = self
            .data_loader
            .load_tileset(TILESET_RESOURCE)
            .map_err(|source| EngineError::Content {
                resource: TILESET_RESOURCE.to_string(),
                source: Box::new(source),
            })?;
        let archetypes = self
            .data_loader
            .load_archetypes(ARCHETYPE_RESOURCE)
            .map_err(|source| EngineError::Content {
                resource: ARCHETYPE_RESOURCE.to_string(),
                source: Box::new(source),
            })?;
        Ok(Content {
            tileset,
            archetypes,
        })
    }

    /// Start a fresh adventure at the village.
    ///
    /// The same seed reproduces the same world and the same rolls.
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded or the world cannot be
    /// generated.
    pub fn new_game(&self, services: Services, seed: Option<u64>) -> Result<Game, EngineError> {
        let content = self.content()?;
        let world = World::generate_random(self.config.world_size, &content.tileset, seed)?;
        let rng = seed.map_or_else(RngBundle::from_entropy, RngBundle::from_user_seed);
        log::info!(
            "new game: {}x{} world, seed {:?}",
            world.width(),
            world.height(),
            world.seed()
        );
        Ok(Game::new(services, content, self.config.clone(), world, rng))
    }

    /// Like [`Self::new_game`], but parked on the start menu.
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded or the world cannot be
    /// generated.
    pub fn start_menu(&self, services: Services, seed: Option<u64>) -> Result<Game, EngineError> {
        let mut game = self.new_game(services, seed)?;
        game.change_state(GameState::StartMenu);
        Ok(game)
    }

    /// Resume a saved session, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if content or the save cannot be loaded, or the save
    /// is inconsistent.
    pub fn resume(&self, services: Services, save_name: &str) -> Result<Option<Game>, EngineError> {
        let Some(save) = services
            .storage()
            .load(save_name)
            .map_err(|source| EngineError::Storage {
                name: save_name.to_string(),
                source: source.into(),
            })?
        else {
            return Ok(None);
        };
        let content = self.content()?;
        let world = save.world.clone();
        let mut game = Game::new(
            services,
            content,
            self.config.clone(),
            world,
            RngBundle::from_entropy(),
        );
        game.from_save(save)?;
        Ok(Some(game))
    }
}

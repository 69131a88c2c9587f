//! Session orchestrator: owns the world, the player and the state machine,
//! and routes every player request through the action catalog.
use std::collections::{BTreeSet, HashMap};

use crate::Services;
use crate::actions::{Action, ActionCatalog, ActionKind, CatalogView};
use crate::combat::CombatState;
use crate::config::GameConfig;
use crate::data::Content;
use crate::error::{ActionError, ActionFailure};
use crate::events::{EventQueue, GameEvent};
use crate::game_log::GameLog;
use crate::player::Player;
use crate::rng::RngBundle;
use crate::state::{GameState, Pending};
use crate::store::Shop;
use crate::world::{Position, Tile, World};

mod combat;
mod explore;
mod persist;
mod render;

/// Everything that a restart or a load swaps out wholesale.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) world: World,
    pub(crate) player: Player,
    pub(crate) pos: Position,
    pub(crate) state: GameState,
    pub(crate) combat: Option<CombatState>,
    pub(crate) explored: BTreeSet<Position>,
    pub(crate) pending: Option<Pending>,
    /// Prompt shown while a confirmation is pending.
    pub(crate) question: String,
    /// Whether the player already rested on the current tile.
    pub(crate) rested: bool,
    /// Merchant stock, generated on first visit.
    pub(crate) shops: HashMap<Position, Shop>,
}

impl Session {
    pub(crate) fn fresh(world: World) -> Self {
        let pos = world.center();
        Self {
            world,
            player: Player::new_hero(),
            pos,
            state: GameState::Exploring,
            combat: None,
            explored: BTreeSet::from([pos]),
            pending: None,
            question: String::new(),
            rested: false,
            shops: HashMap::new(),
        }
    }
}

/// A single play session.
#[derive(Debug)]
pub struct Game {
    services: Services,
    content: Content,
    config: GameConfig,
    rng: RngBundle,
    log: GameLog,
    events: EventQueue,
    catalog: ActionCatalog,
    ended: bool,
    session: Session,
}

impl Game {
    /// Place a new hero at the center of `world`.
    #[must_use]
    pub fn new(
        services: Services,
        content: Content,
        config: GameConfig,
        world: World,
        rng: RngBundle,
    ) -> Self {
        let log = GameLog::with_capacity(config.log_capacity);
        let mut game = Self {
            services,
            content,
            config,
            rng,
            log,
            events: EventQueue::default(),
            catalog: ActionCatalog::default(),
            ended: false,
            session: Session::fresh(world),
        };
        game.refresh_catalog();
        game
    }

    /// Replace the random streams, e.g. with a seeded bundle in tests.
    #[must_use]
    pub fn with_rng(mut self, rng: RngBundle) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub const fn state(&self) -> GameState {
        self.session.state
    }

    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.session.player
    }

    /// Direct access to the hero, for scripted setups and tooling.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.session.player
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.session.world
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.session.pos
    }

    #[must_use]
    pub const fn combat(&self) -> Option<&CombatState> {
        self.session.combat.as_ref()
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&Pending> {
        self.session.pending.as_ref()
    }

    #[must_use]
    pub const fn explored(&self) -> &BTreeSet<Position> {
        &self.session.explored
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn log(&self) -> &GameLog {
        &self.log
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// Events emitted since the last drain, oldest first.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// True once the player asked to quit.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Actions legal in the current state, rebuilt from the live session.
    #[must_use]
    pub fn available_actions(&self) -> Vec<Action> {
        self.build_catalog().actions().to_vec()
    }

    /// Run an action by id or hotkey.
    ///
    /// Unknown input yields `None`. Internal faults are logged and reported
    /// to the player as a generic failure line.
    pub fn execute_action(&mut self, input: &str) -> Option<String> {
        match self.try_execute_action(input) {
            Ok(output) => output,
            Err(failure) => {
                let message = failure.user_message();
                self.record_failure(failure);
                Some(message)
            }
        }
    }

    /// Log a failure from [`Game::try_execute_action`] and add its generic
    /// message to the session log. Returns the cause chain for display.
    pub fn record_failure(&mut self, failure: ActionFailure) -> anyhow::Error {
        self.log.add_entry(failure.user_message());
        let cause = anyhow::Error::new(failure);
        log::error!("{cause:#}");
        cause
    }

    /// Run an action by id or hotkey, keeping the cause of internal faults.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionFailure`] when the resolved action hits an
    /// internal fault.
    pub fn try_execute_action(&mut self, input: &str) -> Result<Option<String>, ActionFailure> {
        let Some(action) = self.catalog.resolve(input) else {
            let state = self.session.state;
            return Ok(ActionKind::from_id(input).map(|kind| {
                log::debug!("refused {} in state {state}", kind.id());
                kind.refusal(state).to_string()
            }));
        };
        let id = action.id.clone();
        let kind = action.kind.clone();
        log::debug!("executing {id} in state {}", self.session.state);
        let result = self.dispatch(&kind);
        self.refresh_catalog();
        match result {
            Ok(output) => {
                self.log.add_entry(output.clone());
                Ok(Some(output))
            }
            Err(cause) => Err(ActionFailure { id, cause }),
        }
    }

    fn dispatch(&mut self, kind: &ActionKind) -> Result<String, ActionError> {
        match kind {
            ActionKind::CombatAttack => self.combat_attack(),
            ActionKind::CombatPotion => self.combat_potion(),
            ActionKind::CombatFlee => self.combat_flee(),
            ActionKind::Cast(spell) => self.combat_cast(spell),
            ActionKind::Look => self.look(),
            ActionKind::Stats => self.stats(),
            ActionKind::GameOverLoad | ActionKind::StartLoadGame => Ok(self.load_game()),
            ActionKind::GameOverRestart => self.restart_game(),
            ActionKind::ShopBuy(item) => self.shop_buy(item),
            ActionKind::ShopExit => self.shop_exit(),
            ActionKind::StartNewGame => self.start_new_game(),
            ActionKind::StartQuit | ActionKind::QuitGame => Ok(self.quit_game()),
            ActionKind::AnswerYes => self.answer_question(true),
            ActionKind::AnswerNo => self.answer_question(false),
            ActionKind::Move(direction) => {
                let (dx, dy) = direction.delta();
                self.move_by(dx, dy, true)
            }
            ActionKind::Map => Ok(self.map()),
            ActionKind::Rest => self.rest(),
            ActionKind::Shop => self.shop_enter(),
            ActionKind::Inventory => Ok(self.inventory()),
            ActionKind::Spells => Ok(self.spells()),
            ActionKind::SaveGame => self.save_game(),
            ActionKind::Help => Ok(self.help_text()),
            ActionKind::Log => Ok(self.get_log()),
        }
    }

    /// Switch state and rebuild the catalog for it.
    pub(crate) fn change_state(&mut self, state: GameState) {
        if self.session.state != state {
            log::debug!("state {} -> {state}", self.session.state);
        }
        self.session.state = state;
        self.refresh_catalog();
    }

    fn refresh_catalog(&mut self) {
        self.catalog = self.build_catalog();
    }

    fn build_catalog(&self) -> ActionCatalog {
        ActionCatalog::build(&CatalogView {
            state: self.session.state,
            player: &self.session.player,
            world: &self.session.world,
            pos: self.session.pos,
            shop: self.session.shops.get(&self.session.pos),
        })
    }

    pub(crate) fn current_tile(&self) -> Result<&Tile, ActionError> {
        self.session
            .world
            .tile(self.session.pos)
            .ok_or(ActionError::MissingTile(self.session.pos))
    }
}

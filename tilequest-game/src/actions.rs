//! Per-state action catalog and input resolution.
//!
//! The catalog is a view: it is rebuilt from the session on every state
//! change and never persisted. Executing an action is the game's job; this
//! module only decides what is on offer and what a typed key refers to.
use serde::Serialize;
use smallvec::{SmallVec, smallvec};
use std::collections::HashMap;
use std::fmt;

use crate::combat::{spell, spell_by_key};
use crate::player::Player;
use crate::state::GameState;
use crate::store::Shop;
use crate::world::{Position, World};

pub type Hotkeys = SmallVec<[String; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Combat,
    GameOver,
    Shop,
    StartMenu,
    Question,
    Travel,
    Info,
    Camp,
    Town,
    System,
}

impl ActionCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::GameOver => "game_over",
            Self::Shop => "shop",
            Self::StartMenu => "start_menu",
            Self::Question => "question",
            Self::Travel => "travel",
            Self::Info => "info",
            Self::Camp => "camp",
            Self::Town => "town",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    const fn id(self) -> &'static str {
        match self {
            Self::North => "move_n",
            Self::South => "move_s",
            Self::West => "move_w",
            Self::East => "move_e",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::South => "South",
            Self::West => "West",
            Self::East => "East",
        }
    }

    fn hotkeys(self) -> Hotkeys {
        let keys: &[&str] = match self {
            Self::North => &["n", "north", "ArrowUp"],
            Self::South => &["s", "south", "ArrowDown"],
            Self::West => &["w", "west", "ArrowLeft", "a"],
            Self::East => &["e", "east", "ArrowRight", "d"],
        };
        keys.iter().map(|k| (*k).to_string()).collect()
    }
}

/// Every operation a player can request. Parameterised variants carry the
/// canonical spell or item name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CombatAttack,
    CombatPotion,
    CombatFlee,
    Cast(String),
    Look,
    Stats,
    GameOverLoad,
    GameOverRestart,
    ShopBuy(String),
    ShopExit,
    StartNewGame,
    StartLoadGame,
    StartQuit,
    AnswerYes,
    AnswerNo,
    Move(Direction),
    Map,
    Rest,
    Shop,
    Inventory,
    Spells,
    SaveGame,
    Help,
    QuitGame,
    Log,
}

impl ActionKind {
    /// Stable id used by presentation layers and the dispatcher.
    #[must_use]
    pub fn id(&self) -> String {
        let fixed = match self {
            Self::Cast(name) => return format!("cast::{}", name.to_lowercase()),
            Self::ShopBuy(item) => return format!("shop_buy::{}", item.to_lowercase()),
            Self::Move(direction) => direction.id(),
            Self::CombatAttack => "combat_attack",
            Self::CombatPotion => "combat_potion",
            Self::CombatFlee => "combat_flee",
            Self::Look => "look",
            Self::Stats => "stats",
            Self::GameOverLoad => "game_over_load",
            Self::GameOverRestart => "game_over_restart",
            Self::ShopExit => "shop_exit",
            Self::StartNewGame => "start_new_game",
            Self::StartLoadGame => "start_load_game",
            Self::StartQuit => "start_quit",
            Self::AnswerYes => "answer_yes",
            Self::AnswerNo => "answer_no",
            Self::Map => "map",
            Self::Rest => "rest",
            Self::Shop => "shop",
            Self::Inventory => "inventory",
            Self::Spells => "spells",
            Self::SaveGame => "save_game",
            Self::Help => "help",
            Self::QuitGame => "quit_game",
            Self::Log => "log",
        };
        fixed.to_string()
    }

    /// Parse a canonical id regardless of the current state.
    ///
    /// Used to tell "unknown input" apart from "known action, wrong moment".
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        if let Some(name) = id.strip_prefix("cast::") {
            return spell_by_key(name).map(|spell| Self::Cast(spell.name.to_string()));
        }
        if let Some(item) = id.strip_prefix("shop_buy::") {
            return (!item.is_empty()).then(|| Self::ShopBuy(item.to_string()));
        }
        let kind = match id.as_str() {
            "combat_attack" => Self::CombatAttack,
            "combat_potion" => Self::CombatPotion,
            "combat_flee" => Self::CombatFlee,
            "look" => Self::Look,
            "stats" => Self::Stats,
            "game_over_load" => Self::GameOverLoad,
            "game_over_restart" => Self::GameOverRestart,
            "shop_exit" => Self::ShopExit,
            "start_new_game" => Self::StartNewGame,
            "start_load_game" => Self::StartLoadGame,
            "start_quit" => Self::StartQuit,
            "answer_yes" => Self::AnswerYes,
            "answer_no" => Self::AnswerNo,
            "map" => Self::Map,
            "rest" => Self::Rest,
            "shop" => Self::Shop,
            "inventory" => Self::Inventory,
            "spells" => Self::Spells,
            "save_game" => Self::SaveGame,
            "help" => Self::Help,
            "quit_game" => Self::QuitGame,
            "log" => Self::Log,
            other => {
                return Direction::ALL
                    .into_iter()
                    .find(|d| d.id() == other)
                    .map(Self::Move);
            }
        };
        Some(kind)
    }

    /// Text returned when the action exists but is not offered in `state`.
    #[must_use]
    pub const fn refusal(&self, state: GameState) -> &'static str {
        match self {
            Self::CombatAttack => "There's nothing to attack.",
            Self::CombatFlee => "There is nothing to flee from.",
            Self::CombatPotion => "You don't need to use a potion now.",
            // In a fight, only unknown spells are missing from the catalog.
            Self::Cast(_) if matches!(state, GameState::Combat) => "You don't know that spell.",
            Self::Cast(_) => "You can't cast that now.",
            Self::AnswerYes | Self::AnswerNo => "No question pending.",
            Self::ShopBuy(_) | Self::ShopExit => "You are not browsing a shop.",
            _ => "You can't do that right now.",
        }
    }
}

/// Presentation record for one offered action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub id: String,
    pub label: String,
    pub hotkeys: Hotkeys,
    pub category: ActionCategory,
    pub enabled: bool,
    pub reason: Option<String>,
    #[serde(skip)]
    pub kind: ActionKind,
}

impl Action {
    fn new(
        kind: ActionKind,
        label: impl Into<String>,
        hotkeys: Hotkeys,
        category: ActionCategory,
    ) -> Self {
        Self {
            id: kind.id(),
            label: label.into(),
            hotkeys,
            category,
            enabled: true,
            reason: None,
            kind,
        }
    }

    fn gated(mut self, enabled: bool, reason: &str) -> Self {
        self.enabled = enabled;
        self.reason = (!enabled).then(|| reason.to_string());
        self
    }
}

fn keys(list: &[&str]) -> Hotkeys {
    list.iter().map(|k| (*k).to_string()).collect()
}

/// Borrowed slice of the session the catalog is computed from.
#[derive(Debug, Clone, Copy)]
pub struct CatalogView<'a> {
    pub state: GameState,
    pub player: &'a Player,
    pub world: &'a World,
    pub pos: Position,
    pub shop: Option<&'a Shop>,
}

/// Offered actions plus the id and alias lookup tables derived from them.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl ActionCatalog {
    #[must_use]
    pub fn build(view: &CatalogView<'_>) -> Self {
        let mut actions = match view.state {
            GameState::Combat => combat_actions(view.player),
            GameState::GameOver => game_over_actions(),
            GameState::Shop => shop_actions(view.shop),
            GameState::StartMenu => start_menu_actions(),
            GameState::AskingQuestion => question_actions(),
            GameState::Exploring => exploring_actions(view),
        };
        actions.extend(system_actions());
        Self::from_actions(actions)
    }

    fn from_actions(actions: Vec<Action>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_alias: HashMap<String, usize> = HashMap::new();
        for (idx, action) in actions.iter().enumerate() {
            by_id.entry(action.id.clone()).or_insert(idx);
            for alias in &action.hotkeys {
                let alias = alias.to_lowercase();
                let same_category = by_alias
                    .get(&alias)
                    .is_some_and(|&existing| actions[existing].category == action.category);
                if !same_category {
                    by_alias.insert(alias, idx);
                }
            }
        }
        Self {
            actions,
            by_id,
            by_alias,
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Resolve raw input by id first, then by alias.
    #[must_use]
    pub fn resolve(&self, input: &str) -> Option<&Action> {
        let key = input.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_id
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .and_then(|&idx| self.actions.get(idx))
    }
}

fn combat_actions(player: &Player) -> Vec<Action> {
    let has_potions = player.potions > 0;
    let mut actions = vec![
        Action::new(
            ActionKind::CombatAttack,
            "Attack",
            keys(&["attack", "a"]),
            ActionCategory::Combat,
        ),
        Action::new(
            ActionKind::CombatPotion,
            "Use Potion",
            keys(&["potion", "p"]),
            ActionCategory::Combat,
        )
        .gated(has_potions, "No potions"),
        Action::new(
            ActionKind::CombatFlee,
            "Flee",
            keys(&["flee", "run", "f"]),
            ActionCategory::Combat,
        ),
        Action::new(
            ActionKind::Look,
            "Examine Enemy",
            keys(&["look", "l"]),
            ActionCategory::Combat,
        ),
        Action::new(ActionKind::Stats, "Stats", keys(&["stats", "s"]), ActionCategory::Combat),
    ];
    for known in &player.known_spells {
        let Some(spell) = spell(known) else {
            continue;
        };
        actions.push(
            Action::new(
                ActionKind::Cast(spell.name.to_string()),
                format!("Cast {} (MP {})", spell.name, spell.mp),
                smallvec![format!("cast {}", spell.name.to_lowercase())],
                ActionCategory::Combat,
            )
            .gated(player.mp >= spell.mp, "Not enough MP"),
        );
    }
    actions
}

fn game_over_actions() -> Vec<Action> {
    vec![
        Action::new(
            ActionKind::GameOverLoad,
            "Load Game",
            keys(&["load", "l"]),
            ActionCategory::GameOver,
        ),
        Action::new(
            ActionKind::GameOverRestart,
            "Restart Game",
            keys(&["restart", "r"]),
            ActionCategory::GameOver,
        ),
    ]
}

fn shop_actions(shop: Option<&Shop>) -> Vec<Action> {
    let mut actions: Vec<Action> = shop
        .map(Shop::items)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            Action::new(
                ActionKind::ShopBuy(item.name.clone()),
                format!("Buy {} (Gold {})", item.name, item.price),
                smallvec![
                    format!("buy {}", item.name.to_lowercase()),
                    (idx + 1).to_string(),
                    item.name.clone(),
                ],
                ActionCategory::Shop,
            )
        })
        .collect();
    actions.push(Action::new(
        ActionKind::ShopExit,
        "Exit Shop",
        keys(&["exit", "e"]),
        ActionCategory::Shop,
    ));
    actions.push(Action::new(
        ActionKind::Look,
        "View Shop",
        keys(&["look", "l"]),
        ActionCategory::Shop,
    ));
    actions.push(Action::new(
        ActionKind::Stats,
        "Stats",
        keys(&["stats", "s"]),
        ActionCategory::Shop,
    ));
    actions
}

fn start_menu_actions() -> Vec<Action> {
    vec![
        Action::new(
            ActionKind::StartNewGame,
            "New Game",
            keys(&["new", "n"]),
            ActionCategory::StartMenu,
        ),
        Action::new(
            ActionKind::StartLoadGame,
            "Load Game",
            keys(&["load", "l"]),
            ActionCategory::StartMenu,
        ),
        Action::new(ActionKind::StartQuit, "Quit", keys(&["quit", "q"]), ActionCategory::StartMenu),
    ]
}

fn question_actions() -> Vec<Action> {
    vec![
        Action::new(ActionKind::AnswerYes, "Yes", keys(&["yes", "y"]), ActionCategory::Question),
        Action::new(ActionKind::AnswerNo, "No", keys(&["no", "n"]), ActionCategory::Question),
        Action::new(ActionKind::Look, "Examine", keys(&["look", "l"]), ActionCategory::Question),
        Action::new(ActionKind::Stats, "Stats", keys(&["stats", "s"]), ActionCategory::Question),
    ]
}

fn exploring_actions(view: &CatalogView<'_>) -> Vec<Action> {
    let mut actions: Vec<Action> = Direction::ALL
        .into_iter()
        .map(|direction| {
            let (dx, dy) = direction.delta();
            Action::new(
                ActionKind::Move(direction),
                direction.label(),
                direction.hotkeys(),
                ActionCategory::Travel,
            )
            .gated(view.world.in_bounds(view.pos, dx, dy), "Edge of the world")
        })
        .collect();
    let has_shop = view.world.tile(view.pos).is_some_and(|tile| tile.shop);
    actions.extend([
        Action::new(ActionKind::Look, "Look", keys(&["look", "l"]), ActionCategory::Info),
        Action::new(ActionKind::Map, "Map", keys(&["map", "m"]), ActionCategory::Info),
        Action::new(
            ActionKind::Stats,
            "Stats",
            keys(&["stats", "character", "c"]),
            ActionCategory::Info,
        ),
        Action::new(ActionKind::Rest, "Rest", keys(&["rest", "r"]), ActionCategory::Camp),
        Action::new(ActionKind::Shop, "Shop", keys(&["shop"]), ActionCategory::Town)
            .gated(has_shop, "No merchant here"),
        Action::new(
            ActionKind::Inventory,
            "Inventory",
            keys(&["inv", "inventory", "i"]),
            ActionCategory::Info,
        ),
        Action::new(ActionKind::Spells, "Spells", keys(&["spells", "k"]), ActionCategory::Info),
    ]);
    actions
}

fn system_actions() -> [Action; 4] {
    [
        Action::new(
            ActionKind::SaveGame,
            "Save Game",
            keys(&["save", "!"]),
            ActionCategory::System,
        ),
        Action::new(ActionKind::Help, "Help", keys(&["help", "h", "?"]), ActionCategory::System),
        Action::new(
            ActionKind::QuitGame,
            "Quit Game",
            keys(&["quit", "q"]),
            ActionCategory::System,
        ),
        Action::new(ActionKind::Log, "Show Log", keys(&["log", "g"]), ActionCategory::System),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_tileset;
    use crate::store::{ItemKind, ShopItem};

    fn world() -> World {
        World::generate_random(5, &default_tileset(), Some(42)).unwrap()
    }

    fn catalog_for(
        state: GameState,
        player: &Player,
        pos: Position,
        shop: Option<&Shop>,
    ) -> ActionCatalog {
        let world = world();
        ActionCatalog::build(&CatalogView {
            state,
            player,
            world: &world,
            pos,
            shop,
        })
    }

    fn ids(catalog: &ActionCatalog) -> Vec<&str> {
        catalog.actions().iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn exploring_offers_travel_and_system_actions() {
        let player = Player::new_hero();
        let catalog = catalog_for(GameState::Exploring, &player, Position::new(2, 2), None);
        let ids = ids(&catalog);
        for expected in [
            "move_n", "move_s", "move_w", "move_e", "look", "map", "stats", "rest", "shop",
            "inventory", "spells",
        ] {
            assert!(ids.contains(&expected), "{expected}");
        }
        assert_eq!(&ids[ids.len() - 4..], ["save_game", "help", "quit_game", "log"]);
        let shop = catalog.resolve("shop").unwrap();
        assert!(!shop.enabled);
        assert_eq!(shop.reason.as_deref(), Some("No merchant here"));
    }

    #[test]
    fn edges_disable_movement() {
        let player = Player::new_hero();
        let catalog = catalog_for(GameState::Exploring, &player, Position::new(0, 0), None);
        let north = catalog.resolve("move_n").unwrap();
        assert!(!north.enabled);
        assert_eq!(north.reason.as_deref(), Some("Edge of the world"));
        assert!(catalog.resolve("move_e").unwrap().enabled);
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let player = Player::new_hero();
        let catalog = catalog_for(GameState::Exploring, &player, Position::new(2, 2), None);
        assert_eq!(catalog.resolve("  ArrowUp ").unwrap().id, "move_n");
        assert_eq!(catalog.resolve("C").unwrap().id, "stats");
        assert_eq!(catalog.resolve("?").unwrap().id, "help");
        assert!(catalog.resolve("dance").is_none());
        assert!(catalog.resolve("   ").is_none());
    }

    #[test]
    fn later_category_overrides_shared_alias() {
        let player = Player::new_hero();
        let catalog = catalog_for(GameState::StartMenu, &player, Position::new(2, 2), None);
        assert_eq!(catalog.resolve("q").unwrap().id, "quit_game");
        assert_eq!(catalog.resolve("start_quit").unwrap().id, "start_quit");
        assert_eq!(catalog.resolve("l").unwrap().id, "start_load_game");
    }

    #[test]
    fn first_alias_wins_within_category() {
        let actions = vec![
            Action::new(ActionKind::Look, "Look", keys(&["x"]), ActionCategory::Info),
            Action::new(ActionKind::Map, "Map", keys(&["x"]), ActionCategory::Info),
        ];
        let catalog = ActionCatalog::from_actions(actions);
        assert_eq!(catalog.resolve("x").unwrap().id, "look");
    }

    #[test]
    fn combat_lists_known_spells_with_mp_gate() {
        let mut player = Player::new_hero();
        player.known_spells = vec![
            "Firebolt".to_string(),
            "Ice Shard".to_string(),
            "Teleport".to_string(),
        ];
        player.mp = 5;
        player.potions = 0;
        let catalog = catalog_for(GameState::Combat, &player, Position::new(2, 2), None);
        let firebolt = catalog.resolve("cast firebolt").unwrap();
        assert_eq!(firebolt.id, "cast::firebolt");
        assert_eq!(firebolt.label, "Cast Firebolt (MP 4)");
        assert!(firebolt.enabled);
        let shard = catalog.resolve("cast::ice shard").unwrap();
        assert!(!shard.enabled);
        assert_eq!(shard.reason.as_deref(), Some("Not enough MP"));
        assert!(catalog.resolve("cast::teleport").is_none());
        assert_eq!(catalog.resolve("p").unwrap().reason.as_deref(), Some("No potions"));
    }

    #[test]
    fn shop_items_are_numbered() {
        let player = Player::new_hero();
        let shop = Shop::from_items(vec![
            ShopItem {
                name: "Heal".to_string(),
                kind: ItemKind::Spell,
                price: 30,
            },
            ShopItem {
                name: "Potion".to_string(),
                kind: ItemKind::Potion,
                price: 5,
            },
        ]);
        let catalog = catalog_for(GameState::Shop, &player, Position::new(2, 2), Some(&shop));
        assert_eq!(catalog.resolve("2").unwrap().id, "shop_buy::potion");
        assert_eq!(catalog.resolve("buy heal").unwrap().label, "Buy Heal (Gold 30)");
        assert_eq!(catalog.resolve("HEAL").unwrap().kind, ActionKind::ShopBuy("Heal".to_string()));
        assert_eq!(catalog.resolve("e").unwrap().id, "shop_exit");
    }

    #[test]
    fn ids_parse_outside_their_state() {
        assert_eq!(ActionKind::from_id("combat_attack"), Some(ActionKind::CombatAttack));
        assert_eq!(
            ActionKind::from_id("CAST::GUARD BREAK"),
            Some(ActionKind::Cast("Guard Break".to_string()))
        );
        assert_eq!(ActionKind::from_id("move_w"), Some(ActionKind::Move(Direction::West)));
        assert_eq!(ActionKind::from_id("fly"), None);
        assert_eq!(
            ActionKind::CombatAttack.refusal(GameState::Exploring),
            "There's nothing to attack."
        );
        let firebolt = ActionKind::Cast("Firebolt".to_string());
        assert_eq!(firebolt.refusal(GameState::Shop), "You can't cast that now.");
        assert_eq!(firebolt.refusal(GameState::Combat), "You don't know that spell.");
        for kind in [ActionKind::Map, ActionKind::Cast("Heal".to_string()), ActionKind::ShopExit] {
            assert_eq!(ActionKind::from_id(&kind.id()), Some(kind));
        }
    }

    #[test]
    fn actions_serialize_for_presentation() {
        let player = Player::new_hero();
        let catalog = catalog_for(GameState::GameOver, &player, Position::new(2, 2), None);
        let value = serde_json::to_value(catalog.actions()).unwrap();
        assert_eq!(value[0]["id"], "game_over_load");
        assert_eq!(value[0]["category"], "game_over");
        assert_eq!(value[0]["hotkeys"][1], "l");
        assert!(value[0]["reason"].is_null());
        assert!(value[0].get("kind").is_none());
    }
}

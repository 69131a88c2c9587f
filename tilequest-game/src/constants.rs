//! Centralized balance and tuning constants for Tilequest game logic.
//!
//! Keeping these together means gameplay math only changes through code
//! review, never through the JSON content files.

// World generation ---------------------------------------------------------
pub(crate) const WORLD_SEED_MIN: u64 = 1;
pub(crate) const WORLD_SEED_MAX: u64 = 10_000_000;
pub(crate) const SHOP_PLACEMENT_SEED_OFFSET: u64 = 1337;
pub(crate) const DANGER_PER_DISTANCE: f64 = 0.05;
pub(crate) const DANGER_CAP: f64 = 0.8;
pub(crate) const DEFAULT_TEMPLATE_DANGER: f64 = 0.2;
pub(crate) const SHOP_TILE_NAME: &str = "Merchant's Caravan";
pub(crate) const SHOP_TILE_DESCRIPTION: &str = "A traveling merchant offers wares and wisdom.";

// Movement -----------------------------------------------------------------
pub(crate) const DANGER_WARNING_THRESHOLD: f64 = 0.6;
pub(crate) const STUCK_CHANCE_PER_PENALTY: f64 = 0.1;
pub(crate) const STUCK_CHANCE_CAP: f64 = 0.5;
pub(crate) const FIELD_FIND_SAFE: f64 = 0.03;
pub(crate) const FIELD_FIND_WILD: f64 = 0.10;

// Rest ---------------------------------------------------------------------
pub(crate) const VILLAGE_REST_BASE: i32 = 8;
pub(crate) const VILLAGE_REST_PER_LEVEL: i32 = 2;
pub(crate) const VILLAGE_POTION_GIFT_CHANCE: f64 = 0.15;
pub(crate) const WILD_REST_BASE: i32 = 4;
pub(crate) const AMBUSH_BASE: f64 = 0.2;
pub(crate) const AMBUSH_CAP: f64 = 0.75;

// Combat -------------------------------------------------------------------
pub(crate) const POTION_HEAL_BASE: i32 = 12;
pub(crate) const FLEE_CHANCE: f64 = 0.5;
pub(crate) const FLEE_CHANCE_STRONG_ENEMY: f64 = 0.35;
pub(crate) const REGEN_TURNS: i32 = 3;
pub(crate) const GUARD_BREAK_TURNS: i32 = 2;
pub(crate) const SHOCK_STUN_CHANCE: f64 = 0.3;
pub(crate) const SHOCK_STUN_TURNS: i32 = 1;
pub(crate) const WEAPON_DROP_CHANCE: f64 = 0.25;

// Enemy scaling ------------------------------------------------------------
pub(crate) const BASE_ARCHETYPE_POOL: usize = 3;
pub(crate) const ENEMY_LEVEL_CAP_OVER_PLAYER: i32 = 3;
pub(crate) const ENEMY_LEVEL_JITTER: [i32; 4] = [-1, 0, 0, 1];
pub(crate) const DEFAULT_BASE_ATTACK: i32 = 3;
pub(crate) const DEFAULT_ENEMY_ASCII: &str = "???";

// Leveling -----------------------------------------------------------------
pub(crate) const XP_CURVE_BASE: i32 = 50;
pub(crate) const XP_CURVE_FACTOR: i32 = 25;

// Shop ---------------------------------------------------------------------
pub(crate) const POTION_ITEM: &str = "Potion";
pub(crate) const POTION_PRICE: i32 = 5;
pub(crate) const GEAR_PRICE_PER_BONUS: i32 = 20;
pub(crate) const SHOP_MAX_SPELLS: usize = 3;

// Log ----------------------------------------------------------------------
pub(crate) const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DEFAULT_LOG_CAPACITY: usize = 10;
pub(crate) const EVENT_QUEUE_CAPACITY: usize = 256;

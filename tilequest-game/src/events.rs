//! Structured events emitted while actions resolve.
//!
//! The text an action returns stays the primary channel. Events carry the
//! same outcomes in a mechanical form for front ends that animate, chart or
//! sound them; they are drained after each action and never persisted.

use serde::{Deserialize, Serialize};

use crate::constants::EVENT_QUEUE_CAPACITY;

/// Mechanical event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AttemptMove,
    CantMove,
    WeatherChanged,
    DangerWarning,
    Moved,
    FoundShop,
    FoundWeapon,
    PickedUpWeapon,
    LeftWeapon,
    Rested,
    CantRest,
    RestInterrupted,
    EnteredShop,
    ExitedShop,
    BoughtItem,
    ShopItemNotFound,
    ShopNotEnoughGold,
    EnteredCombat,
    ExitedCombat,
    Attacked,
    CastSpell,
    OutOfMana,
    UsedPotion,
    FailedFlee,
    EnemyAttacked,
    EnemyStunned,
    EnemyRecovered,
    Regen,
    LevelUp,
}

/// One emitted event. `seq` increases by one per event for the whole
/// session, so gaps reveal events dropped from a full queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub seq: u64,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

/// Bounded buffer of undrained events. The oldest event is dropped when a
/// front end never drains.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn emit(&mut self, kind: EventKind, payload: serde_json::Value) {
        log::trace!("event #{} {kind:?}", self.next_seq);
        if self.events.len() >= EVENT_QUEUE_CAPACITY {
            self.events.remove(0);
        }
        self.events.push(GameEvent {
            seq: self.next_seq,
            kind,
            payload,
        });
        self.next_seq += 1;
    }

    #[must_use]
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

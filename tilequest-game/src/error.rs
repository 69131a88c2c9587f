//! Error types surfaced by the engine.
use thiserror::Error;

use crate::save::SaveError;
use crate::world::{Position, WorldError};

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while setting up a session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load content resource {resource}")]
    Content {
        resource: String,
        #[source]
        source: BoxedError,
    },
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("failed to read save {name}")]
    Storage {
        name: String,
        #[source]
        source: BoxedError,
    },
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Internal fault raised while an action runs.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("combat state is active but no enemy is present")]
    NoActiveCombat,
    #[error("no tile at {0}")]
    MissingTile(Position),
    #[error("storage operation failed")]
    Storage(#[source] BoxedError),
    #[error(transparent)]
    World(#[from] WorldError),
}

/// An action that resolved but could not complete.
#[derive(Debug, Error)]
#[error("action '{id}' failed")]
pub struct ActionFailure {
    pub id: String,
    #[source]
    pub cause: ActionError,
}

impl ActionFailure {
    /// Text shown to the player. The cause is only logged.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Action '{}' failed.", self.id)
    }
}

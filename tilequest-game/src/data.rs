//! Built-in content and the loader that serves it.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DataLoader;
use crate::enemy::EnemyArchetype;
use crate::world::{TileTemplate, Tileset};

const DEFAULT_TILESET_DATA: &str = include_str!("../assets/data/tiles.json");
const DEFAULT_ENEMY_DATA: &str = include_str!("../assets/data/enemies.json");

/// Resource name of the tileset content file.
pub const TILESET_RESOURCE: &str = "tiles.json";
/// Resource name of the enemy archetype content file.
pub const ARCHETYPE_RESOURCE: &str = "enemies.json";

/// Everything a session needs from the content files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub tileset: Tileset,
    pub archetypes: Vec<EnemyArchetype>,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            tileset: default_tileset(),
            archetypes: default_archetypes(),
        }
    }
}

/// Embedded tileset. Falls back to a two-tile world if the asset is broken.
#[must_use]
pub fn default_tileset() -> Tileset {
    Tileset::from_json(DEFAULT_TILESET_DATA).unwrap_or_else(|_| Tileset {
        village: TileTemplate {
            name: "Village".to_string(),
            description: "A quiet village.".to_string(),
            danger: Some(0.0),
            safe: true,
            ascii: None,
            shop: false,
        },
        tiles: vec![TileTemplate {
            name: "Plains".to_string(),
            description: "Open grassland.".to_string(),
            danger: None,
            safe: false,
            ascii: None,
            shop: false,
        }],
    })
}

/// Embedded enemy list, weakest first.
#[must_use]
pub fn default_archetypes() -> Vec<EnemyArchetype> {
    serde_json::from_str(DEFAULT_ENEMY_DATA).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum EmbeddedDataError {
    #[error("no embedded resource named {0}")]
    UnknownResource(String),
    #[error("embedded resource {name} is malformed")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loader backed by the content compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedData;

impl EmbeddedData {
    fn raw(resource: &str) -> Result<&'static str, EmbeddedDataError> {
        match resource {
            TILESET_RESOURCE => Ok(DEFAULT_TILESET_DATA),
            ARCHETYPE_RESOURCE => Ok(DEFAULT_ENEMY_DATA),
            other => Err(EmbeddedDataError::UnknownResource(other.to_string())),
        }
    }
}

impl DataLoader for EmbeddedData {
    type Error = EmbeddedDataError;

    fn load_archetypes(&self, resource: &str) -> Result<Vec<EnemyArchetype>, Self::Error> {
        serde_json::from_str(Self::raw(resource)?).map_err(|source| EmbeddedDataError::Malformed {
            name: resource.to_string(),
            source,
        })
    }

    fn load_tileset(&self, resource: &str) -> Result<Tileset, Self::Error> {
        Tileset::from_json(Self::raw(resource)?).map_err(|source| EmbeddedDataError::Malformed {
            name: resource.to_string(),
            source,
        })
    }
}

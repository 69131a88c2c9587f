//! Filesystem-backed implementations of the engine traits.
//!
//! Content files are read from an assets directory when present and fall
//! back to the data compiled into the engine. Saves are pretty JSON files,
//! one per slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tilequest_game::data::EmbeddedDataError;
use tilequest_game::{
    AsciiLoader, DataLoader, EmbeddedData, EnemyArchetype, GameStorage, SaveData, Tileset,
};

/// Reads content JSON from `<root>/<resource>`, or the embedded defaults.
#[derive(Debug, Clone)]
pub struct FsDataLoader {
    root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum FsDataError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Embedded(#[from] EmbeddedDataError),
}

impl FsDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Text of an override file, or `None` when the assets don't ship one.
    fn read_override(&self, resource: &str) -> Result<Option<(PathBuf, String)>, FsDataError> {
        let path = self.root.join(resource);
        if !path.is_file() {
            log::debug!("no {} override, using embedded data", path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| FsDataError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some((path, text)))
    }
}

impl DataLoader for FsDataLoader {
    type Error = FsDataError;

    fn load_archetypes(&self, resource: &str) -> Result<Vec<EnemyArchetype>, Self::Error> {
        match self.read_override(resource)? {
            Some((path, text)) => {
                serde_json::from_str(&text).map_err(|source| FsDataError::Json { path, source })
            }
            None => Ok(EmbeddedData.load_archetypes(resource)?),
        }
    }

    fn load_tileset(&self, resource: &str) -> Result<Tileset, Self::Error> {
        match self.read_override(resource)? {
            Some((path, text)) => {
                Tileset::from_json(&text).map_err(|source| FsDataError::Json { path, source })
            }
            None => Ok(EmbeddedData.load_tileset(resource)?),
        }
    }
}

/// Save slots stored as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FsStorage {
    dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum FsStorageError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save {path} is not valid JSON")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FsStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, save_name: &str) -> PathBuf {
        self.dir.join(format!("{save_name}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FsStorageError + '_ {
    move |source| FsStorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl GameStorage for FsStorage {
    type Error = FsStorageError;

    fn save_game(&self, save_name: &str, save: &SaveData) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name);
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let json = save
            .to_json()
            .map_err(|source| FsStorageError::Serialization {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, json).map_err(io_error(&path))
    }

    fn load_game(&self, save_name: &str) -> Result<Option<SaveData>, Self::Error> {
        let path = self.slot_path(save_name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path)(err)),
        };
        SaveData::from_json(&text)
            .map(Some)
            .map_err(|source| FsStorageError::Serialization { path, source })
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name);
        match fs::remove_file(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(io_error(&path)(err)),
            _ => Ok(()),
        }
    }
}

/// Text art looked up by file name inside one directory.
#[derive(Debug, Clone)]
pub struct FsAsciiLoader {
    dir: PathBuf,
}

impl FsAsciiLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AsciiLoader for FsAsciiLoader {
    fn load_art(&self, name: &str) -> Option<String> {
        // Only the final component; content files must not escape the art dir.
        let file = Path::new(name).file_name()?;
        let path = self.dir.join(file);
        match fs::read_to_string(&path) {
            Ok(art) => Some(art.trim_end().to_string()),
            Err(err) => {
                log::trace!("no art at {}: {err}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilequest_game::{
        ARCHETYPE_RESOURCE, GameConfig, GameEngine, NoArt, Services, TILESET_RESOURCE,
    };

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("tilequest-platform-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_overrides_fall_back_to_embedded_content() {
        let loader = FsDataLoader::new(scratch_dir("fallback"));
        let tileset = loader.load_tileset(TILESET_RESOURCE).unwrap();
        assert_eq!(tileset.village.name, "Oakheart Village");
        assert_eq!(loader.load_archetypes(ARCHETYPE_RESOURCE).unwrap().len(), 10);
    }

    #[test]
    fn malformed_override_names_the_file() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join(TILESET_RESOURCE), "{ not json").unwrap();
        let err = FsDataLoader::new(&dir).load_tileset(TILESET_RESOURCE).unwrap_err();
        assert!(matches!(
            err,
            FsDataError::Json { ref path, .. } if path.ends_with(TILESET_RESOURCE)
        ));
    }

    #[test]
    fn saves_round_trip_through_disk() {
        let dir = scratch_dir("saves");
        let storage = FsStorage::new(dir.join("nested"));
        assert!(storage.load_game("slot").unwrap().is_none());

        let engine = GameEngine::new(EmbeddedData, GameConfig::default());
        let game = engine
            .new_game(Services::new(storage.clone(), NoArt), Some(42))
            .unwrap();
        let data = game.to_save();
        storage.save_game("slot", &data).unwrap();
        assert!(storage.slot_path("slot").is_file());
        assert_eq!(storage.load_game("slot").unwrap(), Some(data));

        storage.delete_save("slot").unwrap();
        storage.delete_save("slot").unwrap();
        assert!(storage.load_game("slot").unwrap().is_none());
    }

    #[test]
    fn corrupt_save_is_an_error_not_a_panic() {
        let dir = scratch_dir("corrupt");
        fs::write(dir.join("broken.json"), "[]").unwrap();
        let err = FsStorage::new(&dir).load_game("broken").unwrap_err();
        assert!(matches!(err, FsStorageError::Serialization { .. }));
    }

    #[test]
    fn art_lookup_stays_inside_its_directory() {
        let dir = scratch_dir("art");
        fs::write(dir.join("slime.txt"), "  (o_o)  \n\n").unwrap();
        let loader = FsAsciiLoader::new(&dir);
        assert_eq!(loader.load_art("slime.txt").as_deref(), Some("  (o_o)"));
        assert_eq!(loader.load_art("../slime.txt").as_deref(), Some("  (o_o)"));
        assert!(loader.load_art("missing.txt").is_none());
        assert!(loader.load_art("..").is_none());
    }
}

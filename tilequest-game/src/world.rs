//! World grid, tiles and seeded generation.
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::constants::{
    DANGER_CAP, DANGER_PER_DISTANCE, DEFAULT_TEMPLATE_DANGER, SHOP_PLACEMENT_SEED_OFFSET,
    SHOP_TILE_DESCRIPTION, SHOP_TILE_NAME, WORLD_SEED_MAX, WORLD_SEED_MIN,
};
use crate::weather::Weather;

/// Grid coordinate. `x` grows eastward, `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub const fn distance(self, other: Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// World-absolute depth used to scale enemy difficulty.
    #[must_use]
    pub const fn depth(self) -> usize {
        self.x + self.y
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A single cell of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub danger: f64,
    #[serde(default)]
    pub safe: bool,
    #[serde(default)]
    pub ascii: Option<String>,
    #[serde(default)]
    pub shop: bool,
}

impl Tile {
    fn from_template(template: &TileTemplate, default_danger: f64) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            danger: template.danger.unwrap_or(default_danger),
            safe: template.safe,
            ascii: template.ascii.clone(),
            shop: template.shop,
        }
    }

    fn merchant(ascii: Option<String>) -> Self {
        Self {
            name: SHOP_TILE_NAME.to_string(),
            description: SHOP_TILE_DESCRIPTION.to_string(),
            danger: 0.0,
            safe: true,
            ascii,
            shop: true,
        }
    }
}

/// Template a generated tile is stamped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileTemplate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub danger: Option<f64>,
    #[serde(default)]
    pub safe: bool,
    #[serde(default)]
    pub ascii: Option<String>,
    #[serde(default)]
    pub shop: bool,
}

/// Village plus the pool of wilderness templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub village: TileTemplate,
    pub tiles: Vec<TileTemplate>,
}

impl Tileset {
    /// Load a tileset from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a tileset.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("world size must be at least 1")]
    EmptySize,
    #[error("tileset has no wilderness tiles")]
    EmptyTileset,
    #[error("grid has {actual} rows but height is {expected}")]
    RowCount { expected: usize, actual: usize },
    #[error("row {row} has {actual} tiles but width is {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Plain record shape used for deserialization; validated into a [`World`].
#[derive(Debug, Clone, Deserialize)]
struct WorldRecord {
    width: usize,
    height: usize,
    #[serde(default)]
    seed: Option<u64>,
    grid: Vec<Vec<Tile>>,
}

impl TryFrom<WorldRecord> for World {
    type Error = WorldError;

    fn try_from(record: WorldRecord) -> Result<Self, Self::Error> {
        Self::from_grid(record.width, record.height, record.grid, record.seed)
    }
}

/// Static grid of tiles. Weather is the only mutable, non-persisted part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WorldRecord")]
pub struct World {
    width: usize,
    height: usize,
    seed: Option<u64>,
    grid: Vec<Vec<Tile>>,
    #[serde(skip)]
    weather: HashMap<Position, Weather>,
}

impl PartialEq for World {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.seed == other.seed
            && self.grid == other.grid
    }
}

impl World {
    /// Build a world from an explicit row-major grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid does not match `width` x `height`.
    pub fn from_grid(
        width: usize,
        height: usize,
        grid: Vec<Vec<Tile>>,
        seed: Option<u64>,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptySize);
        }
        if grid.len() != height {
            return Err(WorldError::RowCount {
                expected: height,
                actual: grid.len(),
            });
        }
        if let Some((row, tiles)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(WorldError::RowWidth {
                row,
                expected: width,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            seed,
            grid,
            weather: HashMap::new(),
        })
    }

    /// Generate a square world centered on the village.
    ///
    /// When `seed` is `None` a fresh seed in `[1, 10_000_000)` is drawn.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero size or an empty tileset.
    pub fn generate_random(
        size: usize,
        tileset: &Tileset,
        seed: Option<u64>,
    ) -> Result<Self, WorldError> {
        if size == 0 {
            return Err(WorldError::EmptySize);
        }
        if tileset.tiles.is_empty() {
            return Err(WorldError::EmptyTileset);
        }
        let seed =
            seed.unwrap_or_else(|| rand::thread_rng().gen_range(WORLD_SEED_MIN..WORLD_SEED_MAX));
        let mut rng = ChaCha20Rng::seed_from_u64(seed);

        let center = Position::new(size / 2, size / 2);
        let mut grid = Vec::with_capacity(size);
        for y in 0..size {
            let mut row = Vec::with_capacity(size);
            for x in 0..size {
                let here = Position::new(x, y);
                if here == center {
                    row.push(Tile::from_template(&tileset.village, 0.0));
                    continue;
                }
                let Some(template) = tileset.tiles.choose(&mut rng) else {
                    return Err(WorldError::EmptyTileset);
                };
                let mut tile = Tile::from_template(template, DEFAULT_TEMPLATE_DANGER);
                tile.danger = scaled_danger(tile.danger, here.distance(center));
                tile.safe = false;
                tile.shop = false;
                row.push(tile);
            }
            grid.push(row);
        }

        let mut shop_rng =
            ChaCha20Rng::seed_from_u64(seed.wrapping_add(SHOP_PLACEMENT_SEED_OFFSET));
        let mut positions: Vec<Position> = (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|pos| *pos != center)
            .collect();
        positions.shuffle(&mut shop_rng);
        let shop_count = shop_count(size);
        for pos in positions
            .into_iter()
            .filter(|pos| pos.distance(center) >= 1)
            .take(shop_count)
        {
            let cell = &mut grid[pos.y][pos.x];
            *cell = Tile::merchant(cell.ascii.take());
        }

        Self::from_grid(size, size, grid, Some(seed))
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Side length used when regenerating a world of the same size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.grid
    }

    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[must_use]
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.grid.get(pos.y).and_then(|row| row.get(pos.x))
    }

    /// Offset a position by a signed delta, clamping to the map bounds.
    #[must_use]
    pub fn clamp_step(&self, from: Position, dx: i32, dy: i32) -> Position {
        Position::new(
            clamp_axis(from.x, dx, self.width),
            clamp_axis(from.y, dy, self.height),
        )
    }

    /// Whether a signed step stays inside the map, without clamping.
    #[must_use]
    pub fn in_bounds(&self, from: Position, dx: i32, dy: i32) -> bool {
        let step = |origin: usize, delta: i32, limit: usize| {
            origin
                .checked_add_signed(delta as isize)
                .is_some_and(|v| v < limit)
        };
        step(from.x, dx, self.width) && step(from.y, dy, self.height)
    }

    #[must_use]
    pub fn weather_at(&self, pos: Position) -> Option<Weather> {
        self.weather.get(&pos).copied()
    }

    /// Re-roll the weather attached to a tile, returning the new condition.
    pub fn reroll_weather<R: Rng + ?Sized>(&mut self, pos: Position, rng: &mut R) -> Weather {
        let weather = Weather::roll(rng);
        self.weather.insert(pos, weather);
        weather
    }

    /// Positions of every merchant tile, row-major.
    #[must_use]
    pub fn shop_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|pos| self.tile(*pos).is_some_and(|tile| tile.shop))
            .collect()
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}

/// Number of merchant tiles placed for a world of `size`.
#[must_use]
pub const fn shop_count(size: usize) -> usize {
    let count = size / 3;
    if count < 1 { 1 } else { count }
}

#[allow(clippy::cast_precision_loss)]
fn scaled_danger(base: f64, distance: usize) -> f64 {
    (base + distance as f64 * DANGER_PER_DISTANCE).clamp(0.0, DANGER_CAP)
}

#[allow(clippy::cast_possible_wrap)]
fn clamp_axis(origin: usize, delta: i32, limit: usize) -> usize {
    let max = limit.saturating_sub(1);
    origin
        .checked_add_signed(delta as isize)
        .map_or(0, |v| v.min(max))
}

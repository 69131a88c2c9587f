//! Weather system and effects
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weather conditions that can settle over a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Rainy,
    Stormy,
    Foggy,
    Snowy,
}

const WEATHER_ORDER: [Weather; 5] = [
    Weather::Sunny,
    Weather::Rainy,
    Weather::Stormy,
    Weather::Foggy,
    Weather::Snowy,
];

/// Effect bundle derived from a weather condition.
///
/// The default value is the empty bundle: full visibility, no encounter
/// delta and no movement penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    pub visibility: f64,
    pub encounter_rate: f64,
    pub movement_penalty: u32,
}

impl Default for WeatherEffect {
    fn default() -> Self {
        Self {
            visibility: 1.0,
            encounter_rate: 0.0,
            movement_penalty: 0,
        }
    }
}

impl WeatherEffect {
    /// Probability that a move from under this weather gets bogged down.
    #[must_use]
    pub fn stuck_chance(&self) -> f64 {
        if self.movement_penalty == 0 {
            return 0.0;
        }
        (crate::constants::STUCK_CHANCE_PER_PENALTY * f64::from(self.movement_penalty))
            .min(crate::constants::STUCK_CHANCE_CAP)
    }
}

impl Weather {
    /// Roll a fresh condition uniformly among all weather types.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        WEATHER_ORDER[rng.gen_range(0..WEATHER_ORDER.len())]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Rainy => "Rainy",
            Self::Stormy => "Stormy",
            Self::Foggy => "Foggy",
            Self::Snowy => "Snowy",
        }
    }

    /// Static effect table lookup.
    #[must_use]
    pub fn effect(self) -> WeatherEffect {
        let empty = WeatherEffect::default();
        match self {
            Self::Sunny => empty,
            Self::Rainy => WeatherEffect {
                visibility: 0.2,
                ..empty
            },
            Self::Stormy => WeatherEffect {
                encounter_rate: 0.2,
                ..empty
            },
            Self::Foggy => WeatherEffect {
                visibility: 0.4,
                ..empty
            },
            Self::Snowy => WeatherEffect {
                movement_penalty: 1,
                ..empty
            },
        }
    }

    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Sunny => "The sun is shining brightly.",
            Self::Rainy => "It's raining steadily.",
            Self::Stormy => "A fierce storm is raging.",
            Self::Foggy => "Thick fog reduces visibility.",
            Self::Snowy => "Snow is falling gently.",
        }
    }

    #[must_use]
    pub const fn stuck_message(self) -> &'static str {
        match self {
            Self::Snowy => "Snowdrifts block your path.",
            _ => "The weather is unusual.",
        }
    }
}

/// Effect bundle for an optional, lazily attached condition.
#[must_use]
pub fn effect_of(weather: Option<Weather>) -> WeatherEffect {
    weather.map(Weather::effect).unwrap_or_default()
}

/// Description for an optional, lazily attached condition.
#[must_use]
pub fn describe(weather: Option<Weather>) -> &'static str {
    weather.map_or("The weather is indescribable.", Weather::describe)
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WEATHER_ORDER
            .into_iter()
            .find(|weather| weather.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

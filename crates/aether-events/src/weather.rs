//! Weather Types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weather kinds of the Aethermoor climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Fog,
    Snow,
    CrystalStorm,
}

impl Weather {
    /// Returns all weather kinds.
    pub fn all() -> &'static [Weather] {
        &[
            Weather::Clear,
            Weather::Cloudy,
            Weather::Rain,
            Weather::Storm,
            Weather::Fog,
            Weather::Snow,
            Weather::CrystalStorm,
        ]
    }

    /// Multiplier applied to the ambient light level.
    pub fn light_modifier(self) -> f64 {
        match self {
            Weather::Clear => 1.0,
            Weather::Cloudy => 0.8,
            Weather::Rain => 0.7,
            Weather::Storm => 0.4,
            Weather::Fog => 0.5,
            Weather::Snow => 0.6,
            Weather::CrystalStorm => 0.6,
        }
    }

    /// Stable lowercase name, identical to the serde encoding.
    pub fn name(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
            Weather::Storm => "storm",
            Weather::Fog => "fog",
            Weather::Snow => "snow",
            Weather::CrystalStorm => "crystal_storm",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error type for parsing a Weather from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWeatherError {
    unknown: String,
}

impl fmt::Display for ParseWeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown weather: '{}'", self.unknown)
    }
}

impl std::error::Error for ParseWeatherError {}

impl FromStr for Weather {
    type Err = ParseWeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Weather::all()
            .iter()
            .copied()
            .find(|w| w.name() == lower)
            .ok_or_else(|| ParseWeatherError {
                unknown: s.to_string(),
            })
    }
}

/// Current weather conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub weather: Weather,
    /// Strength of the weather, 0.0 to 1.0.
    pub intensity: f64,
    /// Fraction of normal sight range, 0.0 to 1.0.
    pub visibility: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
}

impl WeatherCondition {
    /// Creates a condition record.
    pub fn new(weather: Weather, intensity: f64, visibility: f64, wind_speed: f64) -> Self {
        Self {
            weather,
            intensity,
            visibility,
            wind_speed,
        }
    }
}

impl Default for WeatherCondition {
    fn default() -> Self {
        Self {
            weather: Weather::Clear,
            intensity: 0.2,
            visibility: 1.0,
            wind_speed: 5.0,
        }
    }
}

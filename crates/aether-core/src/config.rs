//! Engine configuration.
//!
//! Settings load from a TOML file. Every section is optional; missing
//! sections and fields fall back to built-in defaults. `validate`
//! rejects configurations the engine cannot run with, so bad values
//! fail at startup instead of producing a skewed simulation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use aether_events::{Calendar, GameTime, Season, Weather};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::time::weather::WeatherMatrix;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "engine.toml";

/// Lowest usable time scale, in game minutes per real second.
pub const MIN_TIME_SCALE: f64 = 0.1;

/// Highest usable time scale, in game minutes per real second.
pub const MAX_TIME_SCALE: f64 = 3600.0;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Clock start, speed and weather cadence
    pub time: TimeConfig,
    /// Calendar constants
    pub calendar: Calendar,
    /// Event history settings
    pub history: HistoryConfig,
    /// Initial weather and optional transition overrides
    pub weather: WeatherConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            calendar: Calendar::default(),
            history: HistoryConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

/// Clock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub start_year: u32,
    pub start_month: u32,
    pub start_day: u32,
    pub start_hour: u32,
    pub start_minute: u32,
    /// Game minutes per real second
    pub time_scale: f64,
    /// Game minutes between weather rolls
    pub weather_roll_minutes: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start_year: 1,
            start_month: 1,
            start_day: 1,
            start_hour: 6,
            start_minute: 0,
            time_scale: 60.0,
            weather_roll_minutes: 60,
        }
    }
}

/// Event history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Ring capacity; the oldest event is evicted once full
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Weather settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub initial: Weather,
    /// Per-(season, from-weather) transition row overrides
    pub rules: Vec<WeatherRule>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            initial: Weather::Clear,
            rules: Vec::new(),
        }
    }
}

/// One transition row override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRule {
    pub season: Season,
    pub from: Weather,
    /// Target weather to probability; must sum to 1.0 and name `from`
    pub to: HashMap<Weather, f64>,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Loads from the given path, or falls back to defaults if the file
    /// is missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load {}: {}. Using defaults.",
                path.display(),
                e
            );
            Self::default()
        })
    }

    /// Start time assembled from the `[time]` section.
    pub fn start_time(&self) -> GameTime {
        GameTime::new(
            self.time.start_year,
            self.time.start_month,
            self.time.start_day,
            self.time.start_hour,
            self.time.start_minute,
        )
    }

    /// Builds the transition matrix: the standard matrix with each
    /// `[[weather.rules]]` entry replacing its (season, from) row.
    pub fn weather_matrix(&self) -> WeatherMatrix {
        let mut matrix = WeatherMatrix::standard();
        for rule in &self.weather.rules {
            let mut row: Vec<(Weather, f64)> =
                rule.to.iter().map(|(&weather, &p)| (weather, p)).collect();
            // HashMap order is arbitrary; fix it so draws are reproducible
            row.sort_by_key(|&(weather, _)| weather.name());
            matrix.set_row(rule.season, rule.from, row);
        }
        matrix
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.calendar.is_valid() {
            return Err(ConfigError::Invalid(
                "calendar constants must all be non-zero".to_string(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid(
                "history capacity must be non-zero".to_string(),
            ));
        }
        if self.time.time_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be positive, got {}",
                self.time.time_scale
            )));
        }
        if self.time.weather_roll_minutes == 0 {
            return Err(ConfigError::Invalid(
                "weather_roll_minutes must be non-zero".to_string(),
            ));
        }

        let start = self.start_time();
        if start.year == 0 {
            return Err(ConfigError::Invalid("start_year must be at least 1".to_string()));
        }
        if start.month == 0 || start.month > self.calendar.months_per_year {
            return Err(ConfigError::Invalid(format!(
                "start_month {} is outside 1..={}",
                start.month, self.calendar.months_per_year
            )));
        }
        if start.day == 0 || start.day > self.calendar.days_per_month {
            return Err(ConfigError::Invalid(format!(
                "start_day {} is outside 1..={}",
                start.day, self.calendar.days_per_month
            )));
        }
        if start.hour >= self.calendar.hours_per_day {
            return Err(ConfigError::Invalid(format!(
                "start_hour {} is outside 0..{}",
                start.hour, self.calendar.hours_per_day
            )));
        }
        if start.minute >= self.calendar.minutes_per_hour {
            return Err(ConfigError::Invalid(format!(
                "start_minute {} is outside 0..{}",
                start.minute, self.calendar.minutes_per_hour
            )));
        }

        self.weather_matrix().validate()
    }
}

/// Configuration error type
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.time.time_scale, 60.0);
        assert_eq!(config.time.weather_roll_minutes, 60);
        assert_eq!(config.history.capacity, 1000);
        assert_eq!(config.calendar.days_per_month, 30);
        assert_eq!(config.weather.initial, Weather::Clear);
        assert_eq!(config.start_time(), GameTime::new(1, 1, 1, 6, 0));
    }

    #[test]
    fn test_default_config_validates() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [time]
            time_scale = 120.0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.time.time_scale, 120.0);
        // Unspecified values fall back
        assert_eq!(config.time.start_hour, 6);
        assert_eq!(config.history.capacity, 1000);
    }

    #[test]
    fn test_parse_calendar_section() {
        let toml = r#"
            [calendar]
            days_per_month = 8
            months_per_year = 4
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.calendar.days_per_month, 8);
        assert_eq!(config.calendar.months_per_year, 4);
        assert_eq!(config.calendar.minutes_per_hour, 60);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_calendar_rejected() {
        let toml = r#"
            [calendar]
            months_per_year = 0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("calendar"));
    }

    #[test]
    fn test_zero_history_capacity_rejected() {
        let toml = r#"
            [history]
            capacity = 0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("history capacity"));
    }

    #[test]
    fn test_zero_roll_cadence_rejected() {
        let toml = r#"
            [time]
            weather_roll_minutes = 0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_start_time_outside_calendar_rejected() {
        let toml = r#"
            [time]
            start_month = 13
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("start_month"));
    }

    #[test]
    fn test_negative_time_scale_rejected() {
        let toml = r#"
            [time]
            time_scale = -1.0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weather_rule_replaces_row() {
        let toml = r#"
            [weather]
            initial = "snow"

            [[weather.rules]]
            season = "winter"
            from = "snow"

            [weather.rules.to]
            snow = 0.5
            clear = 0.5
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(config.weather.initial, Weather::Snow);

        let matrix = config.weather_matrix();
        let row = matrix.row(Season::Winter, Weather::Snow).unwrap();
        assert_eq!(row.len(), 2);
        // Untouched rows come from the standard matrix
        assert!(matrix.row(Season::Summer, Weather::Clear).is_some());
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_weather_rule_rejected() {
        let toml = r#"
            [[weather.rules]]
            season = "spring"
            from = "clear"

            [weather.rules.to]
            clear = 0.5
            rain = 0.4
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sums to"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(
            &path,
            r#"
            [time]
            start_hour = 12
            time_scale = 30.0
            "#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.time.start_hour, 12);
        assert_eq!(config.time.time_scale, 30.0);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = EngineConfig::load("/nonexistent/engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let config = EngineConfig::load_or_default("/nonexistent/engine.toml");
        assert_eq!(config.time.time_scale, 60.0);
    }

    #[test]
    fn test_malformed_toml_errors() {
        let err = EngineConfig::from_str("[time\nbroken").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}

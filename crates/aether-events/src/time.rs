//! Game Time Types
//!
//! Handles in-game time with a configurable calendar and human-readable
//! string formats.
//!
//! # Example
//!
//! ```
//! use aether_events::{Calendar, GameTime};
//!
//! let calendar = Calendar::default();
//! let mut time = GameTime::start();
//! time.advance_minutes(30, &calendar);
//! assert_eq!(time.to_string(), "06:30 - day 1, month 1, year 1");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default number of minutes in an hour.
pub const DEFAULT_MINUTES_PER_HOUR: u32 = 60;

/// Default number of hours in a day.
pub const DEFAULT_HOURS_PER_DAY: u32 = 24;

/// Default number of days in a month.
pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;

/// Default number of months in a year.
pub const DEFAULT_MONTHS_PER_YEAR: u32 = 12;

/// Calendar constants for time arithmetic.
///
/// All rollover math goes through these values so the calendar can be
/// reconfigured without touching the arithmetic. Every field must be
/// non-zero; configuration validation enforces this before a calendar
/// reaches time arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calendar {
    pub minutes_per_hour: u32,
    pub hours_per_day: u32,
    pub days_per_month: u32,
    pub months_per_year: u32,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            minutes_per_hour: DEFAULT_MINUTES_PER_HOUR,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            months_per_year: DEFAULT_MONTHS_PER_YEAR,
        }
    }
}

impl Calendar {
    /// Returns the number of minutes in one day.
    pub fn minutes_per_day(&self) -> u64 {
        self.minutes_per_hour as u64 * self.hours_per_day as u64
    }

    /// Returns the number of minutes in one month.
    pub fn minutes_per_month(&self) -> u64 {
        self.minutes_per_day() * self.days_per_month as u64
    }

    /// Returns the number of minutes in one year.
    pub fn minutes_per_year(&self) -> u64 {
        self.minutes_per_month() * self.months_per_year as u64
    }

    /// Returns true if every field is non-zero.
    pub fn is_valid(&self) -> bool {
        self.minutes_per_hour > 0
            && self.hours_per_day > 0
            && self.days_per_month > 0
            && self.months_per_year > 0
    }
}

/// Period of the day derived from the hour.
///
/// The table assumes a 24-hour day; hours past the table fall into Night.
/// Midnight starts at hour 0 so crossing a date boundary always changes
/// the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Midnight,
    Dawn,
    Morning,
    Midday,
    Afternoon,
    Dusk,
    Evening,
    Night,
}

impl DayPeriod {
    /// Returns all periods in chronological order.
    pub fn all() -> &'static [DayPeriod] {
        &[
            DayPeriod::Midnight,
            DayPeriod::Dawn,
            DayPeriod::Morning,
            DayPeriod::Midday,
            DayPeriod::Afternoon,
            DayPeriod::Dusk,
            DayPeriod::Evening,
            DayPeriod::Night,
        ]
    }

    /// Returns the period for an hour of the day.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=4 => DayPeriod::Midnight,
            5..=6 => DayPeriod::Dawn,
            7..=9 => DayPeriod::Morning,
            10..=13 => DayPeriod::Midday,
            14..=16 => DayPeriod::Afternoon,
            17..=18 => DayPeriod::Dusk,
            19..=21 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    /// Returns true for the daylight periods (dawn through afternoon).
    pub fn is_daytime(self) -> bool {
        matches!(
            self,
            DayPeriod::Dawn | DayPeriod::Morning | DayPeriod::Midday | DayPeriod::Afternoon
        )
    }

    /// Base ambient light level for this period, before weather.
    pub fn base_light_level(self) -> f64 {
        match self {
            DayPeriod::Midnight => 0.1,
            DayPeriod::Dawn => 0.4,
            DayPeriod::Morning => 0.8,
            DayPeriod::Midday => 1.0,
            DayPeriod::Afternoon => 0.9,
            DayPeriod::Dusk => 0.5,
            DayPeriod::Evening => 0.3,
            DayPeriod::Night => 0.2,
        }
    }

    /// Stable lowercase name, identical to the serde encoding.
    pub fn name(self) -> &'static str {
        match self {
            DayPeriod::Midnight => "midnight",
            DayPeriod::Dawn => "dawn",
            DayPeriod::Morning => "morning",
            DayPeriod::Midday => "midday",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Dusk => "dusk",
            DayPeriod::Evening => "evening",
            DayPeriod::Night => "night",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayPeriod {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        DayPeriod::all()
            .iter()
            .copied()
            .find(|p| p.name() == lower)
            .ok_or_else(|| ParseTimeError::InvalidPeriod(s.to_string()))
    }
}

/// Season of the year derived from the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Returns all seasons in order.
    pub fn all() -> &'static [Season] {
        &[Season::Spring, Season::Summer, Season::Autumn, Season::Winter]
    }

    /// Returns the season for a month number (1-based).
    ///
    /// Months 3-5 are spring, 6-8 summer, 9-11 autumn, and the remainder
    /// (12, 1, 2, and anything past a 12-month calendar) winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Returns the next season in order.
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

impl FromStr for Season {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(ParseTimeError::InvalidSeason(s.to_string())),
        }
    }
}

/// A point in game time.
///
/// Year, month and day are 1-based; hour and minute are 0-based.
/// Serializes to strings like "year_1.month_3.day_12.06:30".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl GameTime {
    /// Creates a new GameTime.
    pub fn new(year: u32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// Creates the canonical starting time: dawn of the first day.
    pub fn start() -> Self {
        Self {
            year: 1,
            month: 1,
            day: 1,
            hour: 6,
            minute: 0,
        }
    }

    /// Total minutes elapsed since year 1, month 1, day 1, 00:00.
    pub fn total_minutes(&self, calendar: &Calendar) -> u64 {
        let days = (self.year as u64 - 1)
            * calendar.months_per_year as u64
            * calendar.days_per_month as u64
            + (self.month as u64 - 1) * calendar.days_per_month as u64
            + (self.day as u64 - 1);
        (days * calendar.hours_per_day as u64 + self.hour as u64)
            * calendar.minutes_per_hour as u64
            + self.minute as u64
    }

    /// Reconstructs a GameTime from a total-minutes count.
    pub fn from_total_minutes(total: u64, calendar: &Calendar) -> Self {
        let mph = calendar.minutes_per_hour as u64;
        let hpd = calendar.hours_per_day as u64;
        let dpm = calendar.days_per_month as u64;
        let mpy = calendar.months_per_year as u64;

        let minute = total % mph;
        let hours = total / mph;
        let hour = hours % hpd;
        let days = hours / hpd;
        let day = days % dpm + 1;
        let months = days / dpm;
        let month = months % mpy + 1;
        let year = months / mpy + 1;

        Self {
            year: year as u32,
            month: month as u32,
            day: day as u32,
            hour: hour as u32,
            minute: minute as u32,
        }
    }

    /// Advances by whole minutes, rolling minutes into hours, hours into
    /// days, days into months and months into years.
    pub fn advance_minutes(&mut self, minutes: u64, calendar: &Calendar) {
        let total = self.total_minutes(calendar) + minutes;
        *self = Self::from_total_minutes(total, calendar);
    }

    /// Returns the day period for the current hour.
    pub fn day_period(&self) -> DayPeriod {
        DayPeriod::from_hour(self.hour)
    }

    /// Returns the season for the current month.
    pub fn season(&self) -> Season {
        Season::from_month(self.month)
    }

    /// Returns (year, month, day), ignoring the clock.
    pub fn date(&self) -> (u32, u32, u32) {
        (self.year, self.month, self.day)
    }

    /// Compact date-only string like "day 12, month 3, year 1".
    pub fn date_string(&self) -> String {
        format!("day {}, month {}, year {}", self.day, self.month, self.year)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} - day {}, month {}, year {}",
            self.hour, self.minute, self.day, self.month, self.year
        )
    }
}

/// Error type for parsing time values from strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTimeError {
    InvalidFormat(String),
    InvalidYear(String),
    InvalidMonth(String),
    InvalidDay(String),
    InvalidClock(String),
    InvalidSeason(String),
    InvalidPeriod(String),
}

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimeError::InvalidFormat(s) => {
                write!(
                    f,
                    "invalid time format: '{}', expected 'year_N.month_N.day_N.HH:MM'",
                    s
                )
            }
            ParseTimeError::InvalidYear(s) => write!(f, "invalid year: '{}'", s),
            ParseTimeError::InvalidMonth(s) => write!(f, "invalid month: '{}'", s),
            ParseTimeError::InvalidDay(s) => write!(f, "invalid day: '{}'", s),
            ParseTimeError::InvalidClock(s) => write!(f, "invalid clock: '{}'", s),
            ParseTimeError::InvalidSeason(s) => write!(f, "invalid season: '{}'", s),
            ParseTimeError::InvalidPeriod(s) => write!(f, "invalid day period: '{}'", s),
        }
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for GameTime {
    type Err = ParseTimeError;

    /// Parses a GameTime from a string like "year_1.month_3.day_12.06:30".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(ParseTimeError::InvalidFormat(s.to_string()));
        }

        let year = parts[0]
            .strip_prefix("year_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidYear(parts[0].to_string()))?;

        let month = parts[1]
            .strip_prefix("month_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidMonth(parts[1].to_string()))?;

        let day = parts[2]
            .strip_prefix("day_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidDay(parts[2].to_string()))?;

        let clock = parts[3];
        let (hour_part, minute_part) = clock
            .split_once(':')
            .ok_or_else(|| ParseTimeError::InvalidClock(clock.to_string()))?;
        let hour = hour_part
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidClock(clock.to_string()))?;
        let minute = minute_part
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidClock(clock.to_string()))?;

        Ok(GameTime {
            year,
            month,
            day,
            hour,
            minute,
        })
    }
}

// Custom serialization for GameTime - serialize as a string
impl Serialize for GameTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!(
            "year_{}.month_{}.day_{}.{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        ))
    }
}

impl<'de> Deserialize<'de> for GameTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Snapshot Types
//!
//! Serialization structs for engine state capture at a point in time,
//! used for debugging, inspection, and external save tooling.

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::state::StateId;
use crate::time::{DayPeriod, GameTime, Season};
use crate::weather::WeatherCondition;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Full engine state capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub snapshot_id: String,
    /// Driver tick at capture time.
    pub tick: u64,
    pub time: GameTime,
    pub day_period: DayPeriod,
    pub season: Season,
    /// Ambient light after weather, 0.05 to 1.0.
    pub light_level: f64,
    pub weather: WeatherCondition,
    /// Active states, bottom of the stack first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_states: Vec<StateId>,
    /// Most recent events, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_events: Vec<Event>,
}

impl EngineSnapshot {
    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Weather;

    #[test]
    fn test_generate_snapshot_id() {
        assert_eq!(generate_snapshot_id(3), "snap_000003");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = EngineSnapshot {
            snapshot_id: generate_snapshot_id(1),
            tick: 600,
            time: GameTime::new(1, 3, 12, 19, 30),
            day_period: DayPeriod::Evening,
            season: Season::Spring,
            light_level: 0.3,
            weather: WeatherCondition::new(Weather::Rain, 0.6, 0.7, 18.0),
            active_states: vec![StateId::Gameplay, StateId::PauseMenu],
            recent_events: Vec::new(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tick, 600);
        assert_eq!(parsed.active_states, vec![StateId::Gameplay, StateId::PauseMenu]);
        assert_eq!(parsed.weather.weather, Weather::Rain);
    }

    #[test]
    fn test_empty_lists_skipped() {
        let snapshot = EngineSnapshot {
            snapshot_id: generate_snapshot_id(2),
            tick: 0,
            time: GameTime::start(),
            day_period: DayPeriod::Dawn,
            season: Season::Winter,
            light_level: 0.4,
            weather: WeatherCondition::default(),
            active_states: Vec::new(),
            recent_events: Vec::new(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("active_states"));
        assert!(!json.contains("recent_events"));
    }
}

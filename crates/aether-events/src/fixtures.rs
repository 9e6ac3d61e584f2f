//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // aether-events = { path = "../aether-events", features = ["test-fixtures"] }
//!
//! use aether_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! ```

use crate::Event;

/// Returns sample events from the fixtures file.
///
/// Contains 10 diverse events spanning the player, world, inventory,
/// combat, quest and state categories, including one weather change
/// and one date rollover.
pub fn sample_events() -> Vec<Event> {
    let jsonl = include_str!("../tests/fixtures/sample_events.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            Event::from_jsonl(l)
                .unwrap_or_else(|e| panic!("Failed to parse event line: {}\nError: {}", l, e))
        })
        .collect()
}

/// Returns a specific event by ID from the sample events.
pub fn get_event(event_id: &str) -> Option<Event> {
    sample_events().into_iter().find(|e| e.event_id == event_id)
}

/// Returns the storm weather change event from samples.
pub fn storm_event() -> Event {
    get_event("evt_00000004").expect("Storm event should exist in fixtures")
}

/// Returns the date rollover event from samples.
pub fn rollover_event() -> Event {
    get_event("evt_00000010").expect("Rollover event should exist in fixtures")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;

    #[test]
    fn test_sample_events_load() {
        let events = sample_events();
        assert_eq!(events.len(), 10, "Should have 10 sample events");

        // Verify event kinds are diverse
        assert!(events.iter().any(|e| e.kind == EventKind::PlayerMoved));
        assert!(events.iter().any(|e| e.kind == EventKind::WeatherChanged));
        assert!(events.iter().any(|e| e.kind == EventKind::StatePushed));
        assert!(events.iter().any(|e| e.kind == EventKind::DateRollover));
    }

    #[test]
    fn test_get_specific_event() {
        let event = get_event("evt_00000007");
        assert!(event.is_some());
        assert_eq!(event.unwrap().kind, EventKind::PlayerDamaged);
    }

    #[test]
    fn test_storm_event_helper() {
        let event = storm_event();
        assert_eq!(event.event_id, "evt_00000004");
        assert_eq!(event.get_str("new_weather"), Some("storm"));
        assert_eq!(event.get_f64("intensity"), Some(0.8));
    }

    #[test]
    fn test_rollover_event_helper() {
        let event = rollover_event();
        assert_eq!(event.kind, EventKind::DateRollover);
        assert_eq!(event.get_u64("days"), Some(1));
    }

    #[test]
    fn test_sample_ticks_are_ordered() {
        let events = sample_events();
        let ticks: Vec<u64> = events.iter().map(|e| e.tick).collect();
        let mut sorted = ticks.clone();
        sorted.sort_unstable();
        assert_eq!(ticks, sorted);
    }
}

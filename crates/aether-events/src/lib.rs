//! Shared event vocabulary and serialization for the Aethermoor engine.
//!
//! This crate contains pure data structures with no coordination logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod kind;
pub mod snapshot;
pub mod state;
pub mod time;
pub mod weather;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export time types
pub use time::{
    Calendar, DayPeriod, GameTime, ParseTimeError, Season, DEFAULT_DAYS_PER_MONTH,
    DEFAULT_HOURS_PER_DAY, DEFAULT_MINUTES_PER_HOUR, DEFAULT_MONTHS_PER_YEAR,
};

// Re-export event types
pub use event::*;
pub use kind::{EventCategory, EventKind, ParseKindError};

// Re-export weather types
pub use weather::{Weather, WeatherCondition};

// Re-export state and snapshot types
pub use snapshot::EngineSnapshot;
pub use state::{ParseStateError, StateId};

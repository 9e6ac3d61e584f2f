//! Runtime coordination: event bus, state stack, time simulation.

pub mod bus;
pub mod config;
pub mod engine;
pub mod history;
pub mod recorder;
pub mod states;
pub mod time;

pub use bus::{EventBus, ListenerId, OwnerHandle};
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use history::{EventHistory, DEFAULT_HISTORY_CAPACITY};
pub use recorder::EventRecorder;
pub use states::{GameState, StateContext, StateStack, StateStackError, Transition};
pub use time::{ScheduleError, ScheduleId, TimeSimulation, WeatherMatrix};

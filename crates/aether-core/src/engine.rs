//! Engine facade.
//!
//! [`Engine`] wires the bus, state stack and time simulation into one
//! explicitly-constructed root. One `tick` drives a frame: the bus
//! clock moves first, then the state stack updates, then time advances
//! and publishes whatever the jump produced.

use std::fmt;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use aether_events::snapshot::generate_snapshot_id;
use aether_events::{EngineSnapshot, Event, StateId};

use crate::bus::EventBus;
use crate::config::{ConfigError, EngineConfig, MAX_TIME_SCALE, MIN_TIME_SCALE};
use crate::states::{GameState, StateStack, StateStackError};
use crate::time::TimeSimulation;

/// The application root: bus, state stack, time simulation and config.
pub struct Engine {
    config: EngineConfig,
    bus: Rc<EventBus>,
    stack: StateStack,
    time: TimeSimulation,
    tick: u64,
    snapshot_seq: u64,
}

impl Engine {
    /// Builds an engine from a configuration. Fails on any
    /// configuration the simulation cannot run with.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        let time = TimeSimulation::new(&config, SmallRng::seed_from_u64(seed))?;
        let bus = Rc::new(EventBus::new(config.history.capacity));
        let stack = StateStack::new(bus.clone());
        tracing::info!(
            "engine ready: seed {}, start {}, history capacity {}",
            seed,
            time.time(),
            config.history.capacity
        );
        Ok(Self {
            config,
            bus,
            stack,
            time,
            tick: 0,
            snapshot_seq: 0,
        })
    }

    /// Drives one frame: bus clock, then state stack, then time.
    pub fn tick(&mut self, delta_secs: f64) {
        self.tick += 1;
        self.bus.set_clock(self.tick);
        self.stack.update(delta_secs);
        self.time
            .advance(delta_secs, self.config.time.time_scale, &self.bus);
    }

    /// Offers an input event to the top state.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        self.stack.handle_input(event)
    }

    /// Renders the top state into the buffer.
    pub fn render(&mut self, out: &mut String) -> fmt::Result {
        self.stack.render(out)
    }

    /// Captures the current engine state with up to `recent_limit`
    /// events from history.
    pub fn snapshot(&mut self, recent_limit: usize) -> EngineSnapshot {
        self.snapshot_seq += 1;
        EngineSnapshot {
            snapshot_id: generate_snapshot_id(self.snapshot_seq),
            tick: self.tick,
            time: self.time.time(),
            day_period: self.time.day_period(),
            season: self.time.season(),
            light_level: self.time.light_level(),
            weather: *self.time.conditions(),
            active_states: self.stack.ids(),
            recent_events: self.bus.recent(recent_limit),
        }
    }

    /// Exits every state and announces the shutdown.
    pub fn shutdown(&mut self) {
        tracing::info!("engine shutting down after {} ticks", self.tick);
        self.stack.shutdown();
    }

    pub fn should_quit(&self) -> bool {
        self.stack.quit_requested()
    }

    pub fn push_state(&mut self, state: Box<dyn GameState>) {
        self.stack.push(state);
    }

    pub fn pop_state(&mut self) -> Result<StateId, StateStackError> {
        self.stack.pop()
    }

    pub fn change_state(&mut self, state: Box<dyn GameState>) {
        self.stack.change(state);
    }

    /// Sets the time scale, clamped to the usable range.
    pub fn set_time_scale(&mut self, scale: f64) {
        let clamped = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
        if clamped != scale {
            tracing::warn!("time scale {} clamped to {}", scale, clamped);
        }
        self.config.time.time_scale = clamped;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    pub fn time(&self) -> &TimeSimulation {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut TimeSimulation {
        &mut self.time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::StateContext;
    use aether_events::EventKind;

    struct Plain {
        id: StateId,
    }

    impl GameState for Plain {
        fn id(&self) -> StateId {
            self.id
        }

        fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "<{}>", self.id)
        }
    }

    /// Publishes a marker event on every update.
    struct Beacon;

    impl GameState for Beacon {
        fn id(&self) -> StateId {
            StateId::Gameplay
        }

        fn update(&mut self, _delta: f64, ctx: &mut StateContext<'_>) {
            ctx.publish(Event::new(EventKind::ActionTriggered).with_entry("from", "beacon"));
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.history.capacity = 0;
        assert!(Engine::new(config, 1).is_err());
    }

    #[test]
    fn test_tick_advances_clock_and_time() {
        let mut engine = engine();
        engine.push_state(Box::new(Plain {
            id: StateId::Gameplay,
        }));

        // One second at the default scale is one game hour
        engine.tick(1.0);

        assert_eq!(engine.current_tick(), 1);
        assert_eq!(engine.bus().current_tick(), 1);
        assert_eq!(engine.time().time().hour, 7);
    }

    #[test]
    fn test_stack_updates_before_time_advances() {
        let mut engine = engine();
        engine.push_state(Box::new(Beacon));

        // The advance crosses 06:00 -> 07:00, a period edge
        engine.tick(1.0);

        let kinds: Vec<EventKind> = engine.bus().recent(10).iter().map(|e| e.kind).collect();
        let beacon = kinds
            .iter()
            .position(|&k| k == EventKind::ActionTriggered)
            .unwrap();
        let period = kinds
            .iter()
            .position(|&k| k == EventKind::DayPeriodChanged)
            .unwrap();
        assert!(beacon < period);
    }

    #[test]
    fn test_events_stamped_with_current_tick() {
        let mut engine = engine();
        engine.push_state(Box::new(Beacon));

        engine.tick(0.001);
        engine.tick(0.001);

        let events = engine.bus().recent_of_kind(EventKind::ActionTriggered, 10);
        assert_eq!(events[0].tick, 1);
        assert_eq!(events[1].tick, 2);
    }

    #[test]
    fn test_snapshot_captures_engine_state() {
        let mut engine = engine();
        engine.push_state(Box::new(Plain {
            id: StateId::MainMenu,
        }));
        engine.tick(0.5);

        let snapshot = engine.snapshot(5);

        assert_eq!(snapshot.snapshot_id, "snap_000001");
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.active_states, vec![StateId::MainMenu]);
        assert_eq!(snapshot.time.minute, 30);
        assert!(snapshot.light_level > 0.0);

        let again = engine.snapshot(5);
        assert_eq!(again.snapshot_id, "snap_000002");
    }

    #[test]
    fn test_render_delegates_to_top_state() {
        let mut engine = engine();
        engine.push_state(Box::new(Plain {
            id: StateId::MainMenu,
        }));

        let mut out = String::new();
        engine.render(&mut out).unwrap();
        assert_eq!(out, "<main_menu>");
    }

    #[test]
    fn test_shutdown_empties_stack() {
        let mut engine = engine();
        engine.push_state(Box::new(Plain {
            id: StateId::MainMenu,
        }));
        engine.push_state(Box::new(Plain {
            id: StateId::Gameplay,
        }));

        engine.shutdown();

        assert!(engine.stack().is_empty());
        assert_eq!(
            engine
                .bus()
                .recent_of_kind(EventKind::StackShutdown, 10)
                .len(),
            1
        );
    }

    #[test]
    fn test_set_time_scale_clamps() {
        let mut engine = engine();
        engine.set_time_scale(10_000.0);
        assert_eq!(engine.config().time.time_scale, MAX_TIME_SCALE);
        engine.set_time_scale(0.0);
        assert_eq!(engine.config().time.time_scale, MIN_TIME_SCALE);
    }
}

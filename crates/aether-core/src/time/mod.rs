//! Calendar time, weather and scheduled events.
//!
//! [`TimeSimulation`] advances game time from frame deltas, announces
//! day-period, season, date and weather changes through the bus, and
//! fires scheduled events. Within one advance the order is fixed:
//! calendar rollover, then edge events, then weather rolls, then
//! scheduled-event firing.

pub mod schedule;
pub mod weather;

pub use schedule::{ScheduleError, ScheduleId, Scheduler};
pub use weather::{WeatherMatrix, WEIGHT_TOLERANCE};

use rand::rngs::SmallRng;
use serde_json::{Map, Value};

use aether_events::{
    Calendar, DayPeriod, Event, EventKind, GameTime, Season, Weather, WeatherCondition,
};

use crate::bus::EventBus;
use crate::config::{ConfigError, EngineConfig, MAX_TIME_SCALE, MIN_TIME_SCALE};

/// Floor for the ambient light level, whatever the period and weather.
pub const MIN_LIGHT_LEVEL: f64 = 0.05;

/// The game clock, weather and scheduler.
#[derive(Debug)]
pub struct TimeSimulation {
    time: GameTime,
    calendar: Calendar,
    /// Fractional virtual minutes not yet applied
    accumulator: f64,
    paused: bool,
    condition: WeatherCondition,
    matrix: WeatherMatrix,
    weather_roll_minutes: u64,
    minutes_until_roll: u64,
    scheduler: Scheduler,
    rng: SmallRng,
}

impl TimeSimulation {
    /// Builds the simulation from a validated configuration.
    pub fn new(config: &EngineConfig, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let matrix = config.weather_matrix();
        Ok(Self {
            time: config.start_time(),
            calendar: config.calendar,
            accumulator: 0.0,
            paused: false,
            condition: WeatherCondition {
                weather: config.weather.initial,
                ..WeatherCondition::default()
            },
            matrix,
            weather_roll_minutes: config.time.weather_roll_minutes,
            minutes_until_roll: config.time.weather_roll_minutes,
            scheduler: Scheduler::new(),
            rng,
        })
    }

    /// Advances game time by `delta_secs * scale` virtual minutes.
    ///
    /// Zero delta is a no-op; negative delta is clamped to zero with a
    /// warning. The scale is clamped to the usable range.
    pub fn advance(&mut self, delta_secs: f64, scale: f64, bus: &EventBus) {
        if self.paused {
            return;
        }
        let delta = if delta_secs < 0.0 {
            tracing::warn!("negative advance delta {} clamped to zero", delta_secs);
            0.0
        } else {
            delta_secs
        };
        let scale = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);

        self.accumulator += delta * scale;
        if self.accumulator < 1.0 {
            return;
        }
        let minutes = self.accumulator.floor() as u64;
        self.accumulator -= minutes as f64;

        let old_time = self.time;
        self.time.advance_minutes(minutes, &self.calendar);

        self.publish_edges(old_time, bus);
        self.roll_weather(minutes, bus);
        self.scheduler
            .fire_due(self.time.total_minutes(&self.calendar), bus);
    }

    /// Publishes date, day-period and season changes by comparing the
    /// time before and after the jump. A multi-edge jump still yields
    /// at most one event of each kind.
    fn publish_edges(&mut self, old_time: GameTime, bus: &EventBus) {
        let minutes_per_day = self.calendar.minutes_per_day();
        let old_days = old_time.total_minutes(&self.calendar) / minutes_per_day;
        let new_days = self.time.total_minutes(&self.calendar) / minutes_per_day;
        if new_days > old_days {
            bus.publish(
                Event::new(EventKind::DateRollover)
                    .with_entry("old_date", old_time.date_string())
                    .with_entry("new_date", self.time.date_string())
                    .with_entry("days", new_days - old_days)
                    .with_source("time"),
            );
        }

        let old_period = old_time.day_period();
        let new_period = self.time.day_period();
        if old_period != new_period {
            tracing::debug!("day period changed {} -> {}", old_period, new_period);
            bus.publish(
                Event::new(EventKind::DayPeriodChanged)
                    .with_entry("old_period", old_period.name())
                    .with_entry("new_period", new_period.name())
                    .with_entry("light_level", self.light_level())
                    .with_source("time"),
            );
        }

        let old_season = old_time.season();
        let new_season = self.time.season();
        if old_season != new_season {
            tracing::info!("season changed {} -> {}", old_season, new_season);
            bus.publish(
                Event::new(EventKind::SeasonChanged)
                    .with_entry("old_season", old_season.to_string())
                    .with_entry("new_season", new_season.to_string())
                    .with_source("time"),
            );
        }
    }

    /// Runs one weather draw per full roll cadence elapsed. Draws chain:
    /// each uses the weather left by the previous one.
    fn roll_weather(&mut self, minutes_elapsed: u64, bus: &EventBus) {
        let mut remaining = minutes_elapsed;
        while remaining > 0 {
            let step = remaining.min(self.minutes_until_roll);
            self.minutes_until_roll -= step;
            remaining -= step;
            if self.minutes_until_roll == 0 {
                self.minutes_until_roll = self.weather_roll_minutes;
                self.roll_once(bus);
            }
        }
    }

    fn roll_once(&mut self, bus: &EventBus) {
        let season = self.time.season();
        let current = self.condition.weather;
        let next = self.matrix.next_weather(&mut self.rng, season, current);
        if next == current {
            return;
        }
        self.condition = weather::roll_conditions(&mut self.rng, next);
        tracing::info!("weather changed {} -> {}", current, next);
        bus.publish(
            Event::new(EventKind::WeatherChanged)
                .with_entry("old_weather", current.name())
                .with_entry("new_weather", next.name())
                .with_entry("intensity", self.condition.intensity)
                .with_entry("visibility", self.condition.visibility)
                .with_source("time"),
        );
    }

    /// Schedules a one-shot event at an absolute game time. A time at
    /// or before the current one fires on the next advance.
    pub fn schedule_at(
        &mut self,
        name: impl Into<String>,
        at: GameTime,
        kind: EventKind,
        payload: Map<String, Value>,
    ) -> ScheduleId {
        self.scheduler
            .schedule(name, at.total_minutes(&self.calendar), kind, payload)
    }

    /// Schedules a one-shot event a number of game minutes from now.
    pub fn schedule_in(
        &mut self,
        name: impl Into<String>,
        minutes_from_now: u64,
        kind: EventKind,
        payload: Map<String, Value>,
    ) -> ScheduleId {
        let trigger = self.time.total_minutes(&self.calendar) + minutes_from_now;
        self.scheduler.schedule(name, trigger, kind, payload)
    }

    /// Schedules a recurring event: first firing `first_in` minutes
    /// from now, then every `every` minutes.
    pub fn schedule_recurring(
        &mut self,
        name: impl Into<String>,
        first_in: u64,
        every: u64,
        kind: EventKind,
        payload: Map<String, Value>,
    ) -> Result<ScheduleId, ScheduleError> {
        let trigger = self.time.total_minutes(&self.calendar) + first_in;
        self.scheduler
            .schedule_recurring(name, trigger, every, kind, payload)
    }

    /// Cancels a scheduled event. Returns false if it already fired.
    pub fn cancel(&mut self, id: ScheduleId) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn pending_schedules(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pause(&mut self) {
        self.paused = true;
        tracing::info!("time paused");
    }

    pub fn resume(&mut self) {
        self.paused = false;
        tracing::info!("time resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Jumps the clock. No period or season change events are emitted;
    /// the next advance measures edges from the new time.
    pub fn set_time(&mut self, time: GameTime, bus: &EventBus) {
        let old = self.time;
        self.time = time;
        self.accumulator = 0.0;
        tracing::info!("time set to {}", self.time);
        bus.publish(
            Event::new(EventKind::TimeSet)
                .with_entry("old_time", old.to_string())
                .with_entry("new_time", self.time.to_string())
                .with_source("time"),
        );
    }

    /// Overrides the weather immediately, bypassing the matrix.
    pub fn force_weather(&mut self, weather: Weather, intensity: f64, bus: &EventBus) {
        let old = self.condition.weather;
        let mut condition = weather::roll_conditions(&mut self.rng, weather);
        condition.intensity = intensity.clamp(0.0, 1.0);
        self.condition = condition;
        tracing::info!("weather forced {} -> {}", old, weather);
        bus.publish(
            Event::new(EventKind::WeatherChanged)
                .with_entry("old_weather", old.name())
                .with_entry("new_weather", weather.name())
                .with_entry("intensity", self.condition.intensity)
                .with_entry("visibility", self.condition.visibility)
                .with_entry("forced", true)
                .with_source("time"),
        );
    }

    /// Ambient light: period base times weather modifier, floored.
    pub fn light_level(&self) -> f64 {
        let base = self.time.day_period().base_light_level();
        let modifier = self.condition.weather.light_modifier();
        (base * modifier).max(MIN_LIGHT_LEVEL)
    }

    pub fn time(&self) -> GameTime {
        self.time
    }

    pub fn weather(&self) -> Weather {
        self.condition.weather
    }

    pub fn conditions(&self) -> &WeatherCondition {
        &self.condition
    }

    pub fn season(&self) -> Season {
        self.time.season()
    }

    pub fn day_period(&self) -> DayPeriod {
        self.time.day_period()
    }
}

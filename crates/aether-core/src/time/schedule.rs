//! Scheduled in-game events.
//!
//! Entries are keyed by an absolute virtual-minute trigger. Firing
//! publishes the entry's event through the bus with source
//! `"scheduler"`; entries overshot by a large advance still fire
//! exactly once. Recurring entries re-arm by adding their interval per
//! firing, so a single large advance can fire one entry several times.

use serde_json::{Map, Value};

use aether_events::{Event, EventKind};

use crate::bus::EventBus;

/// Errors from scheduling requests.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// Recurring entries need a non-zero re-arm interval.
    #[error("recurring interval must be at least one minute")]
    ZeroInterval,
}

/// Handle for cancelling a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleId(u64);

#[derive(Debug)]
struct ScheduledEntry {
    id: ScheduleId,
    name: String,
    trigger_minutes: u64,
    kind: EventKind,
    payload: Map<String, Value>,
    /// Re-arm interval in minutes; `None` fires once.
    recurring: Option<u64>,
}

/// Priority queue of scheduled entries in absolute virtual minutes.
///
/// Entry IDs double as registration order, so due entries fire in
/// `(trigger_minutes, registration)` order.
#[derive(Debug)]
pub struct Scheduler {
    entries: Vec<ScheduledEntry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules a one-shot entry at an absolute virtual minute.
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        trigger_minutes: u64,
        kind: EventKind,
        payload: Map<String, Value>,
    ) -> ScheduleId {
        self.insert(name.into(), trigger_minutes, kind, payload, None)
    }

    /// Schedules a recurring entry: first fires at `trigger_minutes`,
    /// then every `interval` minutes after.
    pub fn schedule_recurring(
        &mut self,
        name: impl Into<String>,
        trigger_minutes: u64,
        interval: u64,
        kind: EventKind,
        payload: Map<String, Value>,
    ) -> Result<ScheduleId, ScheduleError> {
        if interval == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        Ok(self.insert(name.into(), trigger_minutes, kind, payload, Some(interval)))
    }

    fn insert(
        &mut self,
        name: String,
        trigger_minutes: u64,
        kind: EventKind,
        payload: Map<String, Value>,
        recurring: Option<u64>,
    ) -> ScheduleId {
        let id = ScheduleId(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            "scheduled {} ({}) at minute {} (recurring: {:?})",
            name,
            kind,
            trigger_minutes,
            recurring
        );
        self.entries.push(ScheduledEntry {
            id,
            name,
            trigger_minutes,
            kind,
            payload,
            recurring,
        });
        id
    }

    /// Removes an entry. Returns false if it already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, id: ScheduleId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let cancelled = self.entries.len() < before;
        if cancelled {
            tracing::debug!("cancelled scheduled entry {:?}", id);
        }
        cancelled
    }

    /// Fires every entry due at or before `now_minutes`, in
    /// `(trigger, registration)` order. Returns the number fired.
    pub fn fire_due(&mut self, now_minutes: u64, bus: &EventBus) -> usize {
        let mut fired = 0;
        while let Some(idx) = self.next_due(now_minutes) {
            let (event, rearm) = {
                let entry = &mut self.entries[idx];
                let mut event = Event::new(entry.kind).with_source("scheduler");
                event.payload = entry.payload.clone();
                event
                    .payload
                    .insert("schedule".to_string(), Value::from(entry.name.clone()));
                let rearm = match entry.recurring {
                    Some(interval) => {
                        entry.trigger_minutes += interval;
                        true
                    }
                    None => false,
                };
                (event, rearm)
            };
            if !rearm {
                self.entries.swap_remove(idx);
            }
            bus.publish(event);
            fired += 1;
        }
        fired
    }

    fn next_due(&self, now_minutes: u64) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.trigger_minutes <= now_minutes)
            .min_by_key(|(_, entry)| (entry.trigger_minutes, entry.id.0))
            .map(|(idx, _)| idx)
    }

    /// Absolute minute of the soonest pending trigger.
    pub fn next_trigger(&self) -> Option<u64> {
        self.entries.iter().map(|entry| entry.trigger_minutes).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired_kinds(bus: &EventBus) -> Vec<EventKind> {
        bus.recent(100).iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_one_shot_fires_once_even_when_overshot() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        scheduler.schedule("wake", 100, EventKind::ActionTriggered, Map::new());

        assert_eq!(scheduler.fire_due(99, &bus), 0);
        assert_eq!(scheduler.fire_due(500, &bus), 1);
        assert_eq!(scheduler.fire_due(1000, &bus), 0);
        assert!(scheduler.is_empty());

        let events = bus.recent(10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get_str("schedule"), Some("wake"));
        assert_eq!(events[0].source.as_deref(), Some("scheduler"));
    }

    #[test]
    fn test_recurring_fires_per_elapsed_interval() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .schedule_recurring("autosave", 60, 60, EventKind::SaveRequested, Map::new())
            .unwrap();

        // 150 minutes elapsed: due at 60 and 120, next trigger 180
        assert_eq!(scheduler.fire_due(150, &bus), 2);
        assert_eq!(scheduler.next_trigger(), Some(180));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut scheduler = Scheduler::new();
        let err = scheduler
            .schedule_recurring("bad", 10, 0, EventKind::SaveRequested, Map::new())
            .unwrap_err();
        assert_eq!(err, ScheduleError::ZeroInterval);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_entries_fire_in_trigger_then_registration_order() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        scheduler.schedule("second", 20, EventKind::GamePaused, Map::new());
        scheduler.schedule("first", 10, EventKind::GameResumed, Map::new());
        scheduler.schedule("third", 20, EventKind::SaveRequested, Map::new());

        assert_eq!(scheduler.fire_due(30, &bus), 3);
        assert_eq!(
            fired_kinds(&bus),
            vec![
                EventKind::GameResumed,
                EventKind::GamePaused,
                EventKind::SaveRequested
            ]
        );
    }

    #[test]
    fn test_cancel_removes_pending_entry() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule("doomed", 50, EventKind::ActionTriggered, Map::new());

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.fire_due(100, &bus), 0);
    }

    #[test]
    fn test_payload_carried_through() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        let mut payload = Map::new();
        payload.insert("quest".to_string(), Value::from("midnight_ritual"));
        scheduler.schedule("ritual", 5, EventKind::QuestStarted, payload);

        scheduler.fire_due(10, &bus);
        let events = bus.recent(10);
        assert_eq!(events[0].get_str("quest"), Some("midnight_ritual"));
        assert_eq!(events[0].get_str("schedule"), Some("ritual"));
    }

    #[test]
    fn test_recurring_survives_and_rearms_across_calls() {
        let bus = EventBus::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .schedule_recurring("patrol", 10, 10, EventKind::EnemySpawned, Map::new())
            .unwrap();

        assert_eq!(scheduler.fire_due(10, &bus), 1);
        assert_eq!(scheduler.fire_due(19, &bus), 0);
        assert_eq!(scheduler.fire_due(20, &bus), 1);
        assert_eq!(scheduler.next_trigger(), Some(30));
    }
}

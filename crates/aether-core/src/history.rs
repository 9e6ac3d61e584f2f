//! Bounded event history.
//!
//! A pre-allocated ring buffer of recently published events. When full,
//! the oldest entry is evicted. The bus appends every event after its
//! dispatch completes, so history order is completion order.

use aether_events::{Event, EventKind};

/// Default number of events retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Fixed-capacity ring of events, oldest evicted first.
#[derive(Debug)]
pub struct EventHistory {
    /// Pre-allocated storage.
    slots: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored.
    len: usize,
    /// Total events ever recorded, including evicted ones.
    total_recorded: u64,
}

impl EventHistory {
    /// Creates a ring with the given capacity. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_recorded: 0,
        }
    }

    /// Appends an event. If the ring is full, the oldest event is evicted.
    pub fn record(&mut self, event: Event) {
        self.slots[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_recorded += 1;
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events recorded since creation, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Number of events evicted because the ring was full.
    pub fn evicted_count(&self) -> u64 {
        self.total_recorded.saturating_sub(self.len as u64)
    }

    /// Iterates over retained events from oldest to newest.
    pub fn iter(&self) -> HistoryIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which is the oldest entry
            self.head
        };
        HistoryIter {
            history: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Returns up to `limit` of the most recent events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let skip = self.len.saturating_sub(limit);
        self.iter().skip(skip).cloned().collect()
    }

    /// Returns up to `limit` of the most recent events of one kind, oldest first.
    pub fn recent_of_kind(&self, kind: EventKind, limit: usize) -> Vec<Event> {
        let matching: Vec<&Event> = self.iter().filter(|e| e.kind == kind).collect();
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).cloned().collect()
    }

    /// Removes all retained events. The lifetime counter is not reset.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over an [`EventHistory`], oldest to newest.
pub struct HistoryIter<'a> {
    history: &'a EventHistory,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for HistoryIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.history.slots[self.index].as_ref();
        self.index = (self.index + 1) % self.history.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for HistoryIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_events::generate_event_id;

    fn stamped(kind: EventKind, sequence: u64) -> Event {
        let mut event = Event::new(kind);
        event.event_id = generate_event_id(sequence);
        event.tick = sequence;
        event
    }

    #[test]
    fn test_record_and_iterate_oldest_first() {
        let mut history = EventHistory::new(8);
        history.record(stamped(EventKind::PlayerMoved, 1));
        history.record(stamped(EventKind::PlayerMoved, 2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.total_recorded(), 2);
        assert_eq!(history.evicted_count(), 0);

        let ids: Vec<&str> = history.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["evt_00000001", "evt_00000002"]);
    }

    #[test]
    fn test_ring_wraps_and_evicts_oldest() {
        let mut history = EventHistory::new(3);
        for sequence in 1..=5 {
            history.record(stamped(EventKind::PlayerMoved, sequence));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.total_recorded(), 5);
        assert_eq!(history.evicted_count(), 2);

        // Events 3, 4, 5 remain, oldest first
        let ticks: Vec<u64> = history.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn test_capacity_one() {
        let mut history = EventHistory::new(1);
        history.record(stamped(EventKind::PlayerMoved, 1));
        history.record(stamped(EventKind::PlayerMoved, 2));

        assert_eq!(history.len(), 1);
        assert_eq!(history.iter().next().unwrap().tick, 2);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let history = EventHistory::new(0);
        assert_eq!(history.capacity(), 1);
    }

    #[test]
    fn test_clear_keeps_lifetime_counter() {
        let mut history = EventHistory::new(4);
        history.record(stamped(EventKind::PlayerMoved, 1));
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.total_recorded(), 1);
    }

    #[test]
    fn test_recent_returns_tail() {
        let mut history = EventHistory::new(10);
        for sequence in 1..=6 {
            history.record(stamped(EventKind::PlayerMoved, sequence));
        }

        let recent = history.recent(3);
        let ticks: Vec<u64> = recent.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![4, 5, 6]);

        // Limit larger than contents returns everything
        assert_eq!(history.recent(100).len(), 6);
    }

    #[test]
    fn test_recent_of_kind_filters() {
        let mut history = EventHistory::new(10);
        history.record(stamped(EventKind::PlayerMoved, 1));
        history.record(stamped(EventKind::WeatherChanged, 2));
        history.record(stamped(EventKind::PlayerMoved, 3));
        history.record(stamped(EventKind::WeatherChanged, 4));

        let weather = history.recent_of_kind(EventKind::WeatherChanged, 10);
        let ticks: Vec<u64> = weather.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![2, 4]);

        let last = history.recent_of_kind(EventKind::WeatherChanged, 1);
        assert_eq!(last[0].tick, 4);
    }

    #[test]
    fn test_iter_exact_size() {
        let mut history = EventHistory::new(8);
        for sequence in 1..=5 {
            history.record(stamped(EventKind::PlayerMoved, sequence));
        }
        assert_eq!(history.iter().len(), 5);
    }
}

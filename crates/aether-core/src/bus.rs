//! Synchronous event bus.
//!
//! Listeners subscribe per event kind with an integer priority; lower
//! priorities run first, ties run in registration order. Dispatch is
//! fully synchronous: `publish` returns only after every listener for
//! the kind has run and the event has been appended to history.
//!
//! # Re-entrancy
//!
//! The bus uses interior mutability so listeners may publish, subscribe
//! and unsubscribe from inside a dispatch. Each publish iterates over a
//! snapshot of the listener list taken before the first invocation, so
//! mid-dispatch registry changes take effect on the next publish.
//!
//! # Listener failure
//!
//! A panicking listener is caught, logged, and skipped; remaining
//! listeners still run and the event still reaches history. One broken
//! subscriber cannot stall the frame.
//!
//! # Ownership
//!
//! Registrations are tied to an [`OwnerHandle`]. Dropping or revoking
//! the handle invalidates all of its registrations without touching the
//! bus: dead entries are skipped at dispatch and purged lazily, or
//! eagerly on [`EventBus::unsubscribe`].

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use aether_events::{generate_event_id, Event, EventKind};

use crate::history::{EventHistory, DEFAULT_HISTORY_CAPACITY};

/// Liveness scope for listener registrations.
///
/// The handle is deliberately not clonable: exactly one owner holds it,
/// and when that owner drops it every registration made under it goes
/// dead at once.
pub struct OwnerHandle {
    alive: Rc<Cell<bool>>,
}

impl OwnerHandle {
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Invalidates every registration made under this handle.
    pub fn revoke(&self) {
        self.alive.set(false);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    fn flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.alive)
    }
}

impl Default for OwnerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OwnerHandle {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

/// Opaque identifier for a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Rc<RefCell<dyn FnMut(&Event)>>;

struct ListenerEntry {
    id: ListenerId,
    priority: i32,
    /// Monotonic registration counter, the tiebreak within a priority.
    registered: u64,
    alive: Rc<Cell<bool>>,
    handler: Handler,
}

/// The central event bus.
pub struct EventBus {
    /// Listener lists indexed by `EventKind::index()`, each kept sorted
    /// by (priority, registered).
    listeners: RefCell<Vec<Vec<ListenerEntry>>>,
    history: RefCell<EventHistory>,
    /// Driver tick stamped onto published events; set once per frame.
    clock: Cell<u64>,
    /// Publish counter feeding event IDs.
    sequence: Cell<u64>,
    next_listener: Cell<u64>,
}

impl EventBus {
    /// Creates a bus retaining `history_capacity` events.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            listeners: RefCell::new((0..EventKind::COUNT).map(|_| Vec::new()).collect()),
            history: RefCell::new(EventHistory::new(history_capacity)),
            clock: Cell::new(0),
            sequence: Cell::new(0),
            next_listener: Cell::new(0),
        }
    }

    /// Sets the tick stamped onto subsequently published events.
    pub fn set_clock(&self, tick: u64) {
        self.clock.set(tick);
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.get()
    }

    /// Subscribes at the default priority 0.
    pub fn subscribe<F>(&self, kind: EventKind, owner: &OwnerHandle, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.subscribe_with_priority(kind, 0, owner, handler)
    }

    /// Subscribes with an explicit priority. Lower priorities are
    /// delivered first; listeners at the same priority are delivered in
    /// registration order.
    pub fn subscribe_with_priority<F>(
        &self,
        kind: EventKind,
        priority: i32,
        owner: &OwnerHandle,
        handler: F,
    ) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        let serial = self.next_listener.get();
        self.next_listener.set(serial + 1);
        let id = ListenerId(serial);

        let mut lists = self.listeners.borrow_mut();
        let list = &mut lists[kind.index()];
        list.push(ListenerEntry {
            id,
            priority,
            registered: serial,
            alive: owner.flag(),
            handler: Rc::new(RefCell::new(handler)),
        });
        list.sort_by_key(|entry| (entry.priority, entry.registered));
        id
    }

    /// Removes one registration. Also eagerly purges entries whose
    /// owner has gone away. Returns true if the ID was present.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut lists = self.listeners.borrow_mut();
        let list = &mut lists[kind.index()];
        let had = list.iter().any(|entry| entry.id == id);
        list.retain(|entry| entry.id != id && entry.alive.get());
        had
    }

    /// Publishes an event to every live listener of its kind.
    ///
    /// The event is stamped with an ID and the current tick, delivered
    /// in (priority, registration) order, and appended to history after
    /// the last listener returns. Listeners registered during this
    /// dispatch do not receive it; listeners unsubscribed during this
    /// dispatch still do.
    pub fn publish(&self, mut event: Event) {
        let sequence = self.sequence.get() + 1;
        self.sequence.set(sequence);
        event.event_id = generate_event_id(sequence);
        event.tick = self.clock.get();

        let idx = event.kind.index();

        // Snapshot before the first invocation; the borrow must end
        // before any handler runs so handlers can touch the registry.
        let snapshot: Vec<(ListenerId, Rc<Cell<bool>>, Handler)> = {
            let lists = self.listeners.borrow();
            lists[idx]
                .iter()
                .map(|entry| {
                    (
                        entry.id,
                        Rc::clone(&entry.alive),
                        Rc::clone(&entry.handler),
                    )
                })
                .collect()
        };

        let mut saw_dead = false;
        for (id, alive, handler) in snapshot {
            if !alive.get() {
                saw_dead = true;
                continue;
            }
            let Ok(mut callback) = handler.try_borrow_mut() else {
                // Already running further up this call stack: the
                // listener published its own kind. Skip the nested
                // delivery rather than aliasing the closure.
                tracing::debug!(
                    "listener {:?} re-entered its own dispatch of {}, skipping",
                    id,
                    event.kind
                );
                continue;
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(&event))) {
                tracing::error!(
                    "listener {:?} panicked handling {}: {}",
                    id,
                    event.kind,
                    panic_message(payload.as_ref())
                );
            }
        }

        if saw_dead {
            self.listeners.borrow_mut()[idx].retain(|entry| entry.alive.get());
        }

        self.history.borrow_mut().record(event);
    }

    /// Number of live listeners for one kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow()[kind.index()]
            .iter()
            .filter(|entry| entry.alive.get())
            .count()
    }

    /// Number of live listeners across all kinds.
    pub fn total_listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .map(|list| list.iter().filter(|entry| entry.alive.get()).count())
            .sum()
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.borrow().capacity()
    }

    /// Total events ever published, including ones evicted from history.
    pub fn total_published(&self) -> u64 {
        self.history.borrow().total_recorded()
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        self.history.borrow().recent(limit)
    }

    /// The most recent `limit` events of one kind, oldest first.
    pub fn recent_of_kind(&self, kind: EventKind, limit: usize) -> Vec<Event> {
        self.history.borrow().recent_of_kind(kind, limit)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

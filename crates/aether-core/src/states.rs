//! Application state stack.
//!
//! States live in a stack: the top state receives update, input and
//! render calls; states beneath it are paused. Pushing pauses the old
//! top, popping resumes the new one, and `change` swaps the top without
//! resuming anything beneath it.
//!
//! States request transitions through their [`StateContext`] rather
//! than mutating the stack directly; requests queue up and are applied
//! at the start of the next update. External collaborators holding the
//! stack itself may call [`StateStack::push`] and friends immediately.

use std::fmt;
use std::rc::Rc;

use aether_events::{Event, EventKind, StateId};

use crate::bus::EventBus;

/// Errors from stack mutation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateStackError {
    /// Popping would leave the stack empty.
    #[error("cannot pop the root state")]
    Underflow,
}

/// A stack transition request.
pub enum Transition {
    Push(Box<dyn GameState>),
    Pop,
    Change(Box<dyn GameState>),
    Quit,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Push(state) => write!(f, "Push({})", state.id()),
            Transition::Pop => write!(f, "Pop"),
            Transition::Change(state) => write!(f, "Change({})", state.id()),
            Transition::Quit => write!(f, "Quit"),
        }
    }
}

/// What a state sees during its lifecycle hooks: the event bus, plus a
/// queue for deferred transition requests.
pub struct StateContext<'a> {
    bus: &'a EventBus,
    requests: &'a mut Vec<Transition>,
}

impl<'a> StateContext<'a> {
    pub fn bus(&self) -> &EventBus {
        self.bus
    }

    /// Publishes through the bus.
    pub fn publish(&self, event: Event) {
        self.bus.publish(event);
    }

    /// Requests a push, applied at the start of the next update.
    pub fn request_push(&mut self, state: Box<dyn GameState>) {
        self.requests.push(Transition::Push(state));
    }

    /// Requests a pop, applied at the start of the next update.
    pub fn request_pop(&mut self) {
        self.requests.push(Transition::Pop);
    }

    /// Requests a top swap, applied at the start of the next update.
    pub fn request_change(&mut self, state: Box<dyn GameState>) {
        self.requests.push(Transition::Change(state));
    }

    /// Requests engine shutdown.
    pub fn request_quit(&mut self) {
        self.requests.push(Transition::Quit);
    }
}

/// A single application state.
///
/// All hooks default to no-ops so states implement only what they use.
pub trait GameState {
    fn id(&self) -> StateId;

    /// Called when the state becomes the top of the stack.
    fn on_enter(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when the state leaves the stack.
    fn on_exit(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when another state is pushed on top of this one.
    fn on_pause(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Called when this state becomes the top again after a pop.
    fn on_resume(&mut self, _ctx: &mut StateContext<'_>) {}

    fn update(&mut self, _delta: f64, _ctx: &mut StateContext<'_>) {}

    /// Returns true if the event was consumed.
    fn handle_input(&mut self, _event: &Event, _ctx: &mut StateContext<'_>) -> bool {
        false
    }

    fn render(&mut self, _out: &mut dyn fmt::Write) -> fmt::Result {
        Ok(())
    }
}

/// The state stack.
pub struct StateStack {
    bus: Rc<EventBus>,
    stack: Vec<Box<dyn GameState>>,
    pending: Vec<Transition>,
    quit_requested: bool,
}

impl StateStack {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            bus,
            stack: Vec::new(),
            pending: Vec::new(),
            quit_requested: false,
        }
    }

    /// Pushes a state: pauses the current top, enters the new state,
    /// and publishes a `state_pushed` event.
    pub fn push(&mut self, state: Box<dyn GameState>) {
        let entering = state.id();
        let paused = self.stack.last().map(|s| s.id());

        if let Some(top) = self.stack.last_mut() {
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            top.on_pause(&mut ctx);
        }

        self.stack.push(state);
        if let Some(top) = self.stack.last_mut() {
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            top.on_enter(&mut ctx);
        }

        tracing::debug!("pushed state {} (depth {})", entering, self.stack.len());
        let mut event = Event::new(EventKind::StatePushed)
            .with_entry("state", entering.name())
            .with_source("state_stack");
        if let Some(paused) = paused {
            event = event.with_entry("paused", paused.name());
        }
        self.bus.publish(event);
    }

    /// Pops the top state: exits it, resumes the state beneath, and
    /// publishes a `state_popped` event.
    ///
    /// The root state is never popped; attempting to leaves the stack
    /// unchanged and returns [`StateStackError::Underflow`].
    pub fn pop(&mut self) -> Result<StateId, StateStackError> {
        if self.stack.len() <= 1 {
            tracing::warn!("refusing to pop the root state");
            return Err(StateStackError::Underflow);
        }
        let Some(mut leaving) = self.stack.pop() else {
            return Err(StateStackError::Underflow);
        };

        let left = leaving.id();
        {
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            leaving.on_exit(&mut ctx);
        }

        let resumed = self.stack.last().map(|s| s.id());
        if let Some(top) = self.stack.last_mut() {
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            top.on_resume(&mut ctx);
        }

        tracing::debug!("popped state {} (depth {})", left, self.stack.len());
        let mut event = Event::new(EventKind::StatePopped)
            .with_entry("state", left.name())
            .with_source("state_stack");
        if let Some(resumed) = resumed {
            event = event.with_entry("resumed", resumed.name());
        }
        self.bus.publish(event);
        Ok(left)
    }

    /// Replaces the top state atomically: exits the old top, enters the
    /// new one, and publishes a `state_changed` event. States beneath
    /// the top are not resumed and not exited.
    ///
    /// On an empty stack this enters the new state as the root.
    pub fn change(&mut self, state: Box<dyn GameState>) {
        let entering = state.id();
        let from = if let Some(mut leaving) = self.stack.pop() {
            let left = leaving.id();
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            leaving.on_exit(&mut ctx);
            Some(left)
        } else {
            None
        };

        self.stack.push(state);
        if let Some(top) = self.stack.last_mut() {
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            top.on_enter(&mut ctx);
        }

        tracing::debug!("changed state to {} (depth {})", entering, self.stack.len());
        let mut event = Event::new(EventKind::StateChanged)
            .with_entry("to", entering.name())
            .with_source("state_stack");
        if let Some(from) = from {
            event = event.with_entry("from", from.name());
        }
        self.bus.publish(event);
    }

    /// Applies queued transition requests, then updates the top state.
    ///
    /// Requests made during this update are applied at the start of the
    /// next one, so a state never mutates the stack mid-call.
    pub fn update(&mut self, delta: f64) {
        self.apply_pending();
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let mut ctx = StateContext {
            bus: &self.bus,
            requests: &mut self.pending,
        };
        top.update(delta, &mut ctx);
    }

    /// Offers an input event to the top state. Returns true if consumed.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        let Some(top) = self.stack.last_mut() else {
            return false;
        };
        let mut ctx = StateContext {
            bus: &self.bus,
            requests: &mut self.pending,
        };
        top.handle_input(event, &mut ctx)
    }

    /// Renders the top state.
    pub fn render(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.stack.last_mut() {
            Some(top) => top.render(out),
            None => Ok(()),
        }
    }

    /// Empties the stack from top to bottom, exiting every state, then
    /// publishes a `stack_shutdown` event.
    pub fn shutdown(&mut self) {
        let exited = self.stack.len() as u64;
        while let Some(mut leaving) = self.stack.pop() {
            let id = leaving.id();
            let mut ctx = StateContext {
                bus: &self.bus,
                requests: &mut self.pending,
            };
            leaving.on_exit(&mut ctx);
            tracing::debug!("exited state {} during shutdown", id);
        }
        self.pending.clear();
        self.bus.publish(
            Event::new(EventKind::StackShutdown)
                .with_entry("states_exited", exited)
                .with_source("state_stack"),
        );
    }

    fn apply_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for transition in pending {
            match transition {
                Transition::Push(state) => self.push(state),
                Transition::Pop => {
                    if let Err(e) = self.pop() {
                        tracing::warn!("deferred pop rejected: {}", e);
                    }
                }
                Transition::Change(state) => self.change(state),
                Transition::Quit => self.quit_requested = true,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// ID of the top state, if any.
    pub fn top_id(&self) -> Option<StateId> {
        self.stack.last().map(|s| s.id())
    }

    /// All state IDs, bottom of the stack first.
    pub fn ids(&self) -> Vec<StateId> {
        self.stack.iter().map(|s| s.id()).collect()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.stack.iter().any(|s| s.id() == id)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

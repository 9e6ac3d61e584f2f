//! Event Carrier Type
//!
//! Events are immutable records: a kind from the closed vocabulary, a
//! schema-free JSON payload, and identity fields stamped by the event bus
//! at publish time. Payload key conventions are documented per category
//! in [`crate::kind`].

use crate::kind::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generates an event ID from a sequence number.
///
/// Format: "evt_00000042"
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// A single event instance.
///
/// `event_id` and `tick` are empty/zero until the bus stamps them during
/// publish; consumers only ever observe stamped events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique ID assigned at publish, like "evt_00000042".
    #[serde(default)]
    pub event_id: String,

    /// What happened.
    pub kind: EventKind,

    /// Driver tick on which the event was published.
    #[serde(default)]
    pub tick: u64,

    /// Free-form payload; key conventions are per kind.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, Value>,

    /// Publisher identity, when one was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Advisory hint for consumers; dispatch ordering ignores it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_hint: Option<i32>,
}

impl Event {
    /// Creates an unstamped event of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            event_id: String::new(),
            kind,
            tick: 0,
            payload: Map::new(),
            source: None,
            priority_hint: None,
        }
    }

    /// Adds a payload entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Sets the publisher identity.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the advisory priority hint.
    pub fn with_priority_hint(mut self, hint: i32) -> Self {
        self.priority_hint = Some(hint);
        self
    }

    /// Reads a string payload entry.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Reads an unsigned integer payload entry.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    /// Reads a float payload entry.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    /// Reads a boolean payload entry.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(Value::as_bool)
    }

    /// Serializes to a single JSONL line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from a single JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

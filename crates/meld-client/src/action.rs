//! Action Queue
//!
//! Outbound operations waiting to be sent. Entries keep their FIFO order;
//! deferred model input is coalesced in place rather than appended again.

use meld_dom::ControlValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One pending outbound operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ActionEntry {
    /// Push a control's value into component state
    SyncInput { name: String, value: ControlValue },
    /// Invoke a component method, optionally with a custom event payload
    CallMethod {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<Value>,
    },
}

impl ActionEntry {
    pub fn sync_input(name: impl Into<String>, value: ControlValue) -> Self {
        Self::SyncInput {
            name: name.into(),
            value,
        }
    }

    pub fn call_method(name: impl Into<String>) -> Self {
        Self::CallMethod {
            name: name.into(),
            message: None,
        }
    }

    /// `payload.name`
    pub fn name(&self) -> &str {
        match self {
            Self::SyncInput { name, .. } | Self::CallMethod { name, .. } => name,
        }
    }
}

/// Entries taken from the queue for one send
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Generation of the queue the entries were taken from
    pub generation: u64,
    pub entries: Vec<ActionEntry>,
}

/// The live queue. Every [`take`](Self::take) starts a new generation, which
/// stands in for the identity of the queue object being sent.
#[derive(Debug, Default)]
pub struct ActionQueue {
    entries: Vec<ActionEntry>,
    generation: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ActionEntry) {
        self.entries.push(entry);
    }

    /// Overwrite the value of every queued input named `name`.
    /// Returns false when there was none to update.
    pub fn coalesce_input(&mut self, name: &str, value: &ControlValue) -> bool {
        let mut found = false;
        for entry in &mut self.entries {
            if let ActionEntry::SyncInput { name: queued, value: slot } = entry {
                if queued == name {
                    *slot = value.clone();
                    found = true;
                }
            }
        }
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hand the queued entries out and start a fresh, empty queue
    pub fn take(&mut self) -> Batch {
        let batch = Batch {
            generation: self.generation,
            entries: std::mem::take(&mut self.entries),
        };
        self.generation += 1;
        batch
    }
}

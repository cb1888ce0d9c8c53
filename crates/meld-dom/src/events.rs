//! DOM Events
//!
//! UI and custom events as seen by document-level listeners.

use crate::NodeId;
use serde_json::Value;

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type name (`click`, `input`, `keyup`, or a custom name)
    pub event_type: String,
    pub target: NodeId,
    /// `KeyboardEvent.key` for keyboard events
    pub key: Option<String>,
    /// `CustomEvent.detail`
    pub detail: Option<Value>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create a bubbling, cancelable UI event
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            key: None,
            detail: None,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new("click", target)
    }

    pub fn input(target: NodeId) -> Self {
        Self::new("input", target)
    }

    /// Create a keyboard event (`keydown`, `keyup`)
    pub fn keyboard(event_type: impl Into<String>, target: NodeId, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(event_type, target)
        }
    }

    /// Create a document-level custom event carrying `detail`
    pub fn custom(name: impl Into<String>, detail: Value) -> Self {
        Self {
            detail: Some(detail),
            cancelable: false,
            ..Self::new(name, NodeId::ROOT)
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

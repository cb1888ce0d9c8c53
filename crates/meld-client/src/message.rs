//! Wire messages exchanged with the server

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionEntry;

/// Arguments a server-rendered component boots with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentArgs {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// `meld-message` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub id: String,
    pub action_queue: Vec<ActionEntry>,
    pub component_name: String,
    pub data: Map<String, Value>,
    #[serde(rename = "renderDOM")]
    pub render_dom: bool,
}

/// Navigation instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub url: String,
}

/// `meld-response` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
    /// Component attributes as a JSON-encoded object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Rendered fragment, present when the DOM was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom: Option<String>,
}

/// `meld-event` payload, redispatched as a document-level custom event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEventPayload {
    pub event: String,
    #[serde(default)]
    pub message: Value,
}

/// `meld-init` acknowledgement: custom event name → component methods
pub type InitAck = BTreeMap<String, Vec<String>>;

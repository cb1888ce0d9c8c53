//! Runtime configuration

use serde::Deserialize;

use crate::MeldError;

/// Client runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MeldConfig {
    /// Attribute namespace (`meld` → `meld:click`)
    pub namespace: String,
    /// Debounce applied when a binding declares none
    pub default_debounce_ms: u64,
    /// Poll interval applied when a poll directive declares none
    pub default_poll_ms: u64,
    /// Ask the server to render the DOM with every response
    pub render_dom: bool,
    /// Un-prefixed names that never become event types
    pub reserved_names: Vec<String>,
}

impl Default for MeldConfig {
    fn default() -> Self {
        Self {
            namespace: "meld".to_string(),
            default_debounce_ms: 150,
            default_poll_ms: 2000,
            render_dom: true,
            reserved_names: ["id", "name", "checksum"].map(String::from).to_vec(),
        }
    }
}

impl MeldConfig {
    /// Parse from JSON; missing keys take their defaults
    pub fn from_json(s: &str) -> Result<Self, MeldError> {
        serde_json::from_str(s).map_err(MeldError::Config)
    }

    /// Attribute prefix including the separator
    pub fn prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    /// Attribute holding a component root's id
    pub fn id_attr(&self) -> String {
        format!("{}:id", self.namespace)
    }
}

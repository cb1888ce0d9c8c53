//! Event Listener Registry
//!
//! Listeners are delegated: one document-level listener per event type,
//! holding a list of (action, element) bindings that is rebuilt wholesale on
//! every refresh. Nothing here keeps a handle that could outlive a node the
//! patcher replaced.

use std::collections::{BTreeMap, HashMap};

use meld_dom::{Document, Event, NodeId};

use crate::element::{Action, Element};
use crate::MeldConfig;

/// An action declared by an element, as seen at the last refresh
#[derive(Debug, Clone)]
pub struct ActionBinding {
    pub action: Action,
    pub element: Element,
}

/// Directive caches and listener bookkeeping for one component
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    /// Event type → bindings, rebuilt by every refresh
    pub action_events: HashMap<String, Vec<ActionBinding>>,
    /// Event types with a document-level listener, model or action
    pub attached_event_types: Vec<String>,
    /// Elements with a model listener, one per physical node
    pub attached_model_events: Vec<Element>,
    /// Custom event name → component methods, from the init handshake
    pub attached_custom_events: BTreeMap<String, Vec<String>>,
    pub model_els: Vec<Element>,
    pub key_els: Vec<Element>,
    pub loading_els: Vec<Element>,
    pub poll_els: Vec<Element>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescan every descendant of `root` (root excluded) and rebuild the
    /// caches. Safe to call repeatedly.
    pub fn refresh(&mut self, document: &mut Document, root: NodeId, config: &MeldConfig) {
        self.action_events.clear();
        self.model_els.clear();
        self.key_els.clear();
        self.loading_els.clear();
        self.poll_els.clear();

        // Model listeners die with their node
        self.attached_model_events
            .retain(|e| document.tree.contains(root, e.node) && e.node != root);

        for node in document.tree.descendants(root) {
            let element = Element::new(document, node, config);
            if !element.is_meld {
                continue;
            }

            if let Some(model) = &element.model {
                if !self.attached_event_types.contains(&model.event_type) {
                    self.attached_event_types.push(model.event_type.clone());
                }
                match self.attached_model_events.iter_mut().find(|e| e.is_same(&element)) {
                    Some(attached) => *attached = element.clone(),
                    None => {
                        tracing::debug!("Attaching model listener on {:?}", element.node);
                        self.attached_model_events.push(element.clone());
                    }
                }
                if !self.model_els.iter().any(|e| e.is_same(&element)) {
                    self.model_els.push(element.clone());
                }
            } else if let Some(loading) = &element.loading {
                // Indicators shown on action are hidden at rest
                if loading.show {
                    element.hide(document);
                }
                self.loading_els.push(element.clone());
            }

            if element.key.is_some() {
                self.key_els.push(element.clone());
            }

            if element.poll.as_ref().is_some_and(|p| !p.disabled) {
                self.poll_els.push(element.clone());
            }

            for action in &element.actions {
                if !self.attached_event_types.contains(&action.event_type) {
                    tracing::debug!("Attaching document listener for {:?}", action.event_type);
                    self.attached_event_types.push(action.event_type.clone());
                }
                self.action_events
                    .entry(action.event_type.clone())
                    .or_default()
                    .push(ActionBinding {
                        action: action.clone(),
                        element: element.clone(),
                    });
            }
        }

        tracing::trace!(
            "Refreshed listeners: {} model, {} loading, {} key, {} event types",
            self.model_els.len(),
            self.loading_els.len(),
            self.key_els.len(),
            self.action_events.len()
        );
    }

    /// Model-bound element the event was fired on, if it listens for this type
    pub fn model_listener(&self, event: &Event) -> Option<&Element> {
        self.attached_model_events.iter().find(|e| {
            e.node == event.target
                && e.model.as_ref().is_some_and(|m| m.event_type == event.event_type)
        })
    }

    pub fn listens_for(&self, event_type: &str) -> bool {
        self.attached_event_types.iter().any(|t| t == event_type)
    }

    pub fn actions_for(&self, event_type: &str) -> &[ActionBinding] {
        self.action_events.get(event_type).map_or(&[], Vec::as_slice)
    }

    /// Register server-declared listeners for custom events
    pub fn add_custom_listeners(&mut self, listeners: BTreeMap<String, Vec<String>>) {
        for (event, methods) in listeners {
            tracing::debug!("Attaching custom listener {:?} -> {:?}", event, methods);
            self.attached_custom_events.entry(event).or_default().extend(methods);
        }
    }

    pub fn custom_methods(&self, event_type: &str) -> &[String] {
        self.attached_custom_events.get(event_type).map_or(&[], Vec::as_slice)
    }

    /// Element declaring `key`
    pub fn key_element(&self, key: &str) -> Option<&Element> {
        self.key_els.iter().find(|e| e.key.as_deref() == Some(key))
    }
}

//! Element Facade
//!
//! Folds every directive on one DOM element into typed views. A facade is a
//! snapshot built on demand; it holds the node id, never a borrow of the
//! document, and is compared by node identity.

use meld_dom::{ControlValue, Document, NodeId};

use crate::directive::{Directive, DirectiveKind, Modifiers};
use crate::MeldConfig;

/// Debounce sentinel meaning "use the configured default"
pub const DEFAULT_DEBOUNCE: i64 = -1;

/// Longest poll interval honoured; larger values are clamped
pub const MAX_POLL_MS: u64 = i32::MAX as u64;

/// Binding of a control's value to component state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    pub name: String,
    /// `blur` for `.lazy` bindings, `input` otherwise
    pub event_type: String,
    pub is_lazy: bool,
    pub is_defer: bool,
    pub debounce_time: i64,
}

/// Loading-state toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingSpec {
    /// Id or key of the element whose actions toggle this one
    pub target: Option<String>,
    pub show: bool,
    pub hide: bool,
    /// Attribute set on the element itself while loading
    pub attr: Option<String>,
    /// Classes added (or removed with `.remove`) while loading
    pub class: Option<String>,
    pub remove_class: bool,
}

/// Periodic method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    pub method: String,
    pub interval_ms: u64,
    pub disabled: bool,
}

/// DOM event → server method binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub event_type: String,
    pub is_prevent: bool,
    pub is_stop: bool,
    /// Keyboard filter, compared against the lowercased `event.key`
    pub key: Option<String>,
    pub debounce_time: i64,
}

/// Aggregated directive view of one element
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub node: NodeId,
    pub is_meld: bool,
    pub id: Option<String>,
    pub model: Option<ModelBinding>,
    pub loading: Option<LoadingSpec>,
    pub poll: Option<PollSpec>,
    pub key: Option<String>,
    pub target: Option<String>,
    pub actions: Vec<Action>,
    pub is_pk: bool,
    pub is_error: bool,
    /// Error codes from `meld:error:<code>`
    pub errors: Vec<String>,
}

fn debounce_arg(modifiers: &Modifiers) -> i64 {
    modifiers
        .arg("debounce")
        .and_then(|ms| ms.parse().ok())
        .unwrap_or(DEFAULT_DEBOUNCE)
}

impl Element {
    /// Scan `node`'s attributes. Non-element nodes yield an empty facade.
    pub fn new(document: &Document, node: NodeId, config: &MeldConfig) -> Self {
        let mut element = Self {
            node,
            ..Self::default()
        };
        let Some(data) = document.tree.element(node) else {
            return element;
        };
        element.id = data.id().map(str::to_string);

        for attr in data.attrs.iter() {
            let directive = Directive::parse_with(config, &attr.name, &attr.value);
            element.is_meld |= directive.is_meld;
            element.fold(directive, config);
        }

        if let Some(loading) = element.loading.as_mut() {
            loading.target = element.target.clone();
        }
        element
    }

    fn fold(&mut self, directive: Directive, config: &MeldConfig) {
        let Directive {
            raw_name,
            raw_value: value,
            kind,
            event_type,
            modifiers,
            ..
        } = directive;

        match kind {
            DirectiveKind::Model | DirectiveKind::Field | DirectiveKind::Db => {
                if let Some(previous) = &self.model {
                    tracing::debug!(
                        "{:?}: {} overrides binding of {:?}",
                        self.node,
                        raw_name,
                        previous.name
                    );
                }
                let is_lazy = modifiers.contains("lazy");
                self.model = Some(ModelBinding {
                    name: value,
                    event_type: if is_lazy { "blur" } else { "input" }.to_string(),
                    is_lazy,
                    is_defer: modifiers.contains("defer"),
                    debounce_time: debounce_arg(&modifiers),
                });
            }
            DirectiveKind::Poll => {
                let local = raw_name.strip_prefix(config.prefix().as_str()).unwrap_or(&raw_name);
                let from_name = local
                    .split('.')
                    .next()
                    .and_then(|head| head.strip_prefix("poll-"))
                    .and_then(|ms| ms.parse().ok());
                let from_modifier = modifiers.iter().find_map(|(name, _)| name.parse().ok());
                self.poll = Some(PollSpec {
                    method: if value.is_empty() { "refresh".to_string() } else { value },
                    interval_ms: from_name
                        .or(from_modifier)
                        .unwrap_or(config.default_poll_ms)
                        .min(MAX_POLL_MS),
                    disabled: modifiers.contains("disable"),
                });
            }
            DirectiveKind::Loading => {
                let loading = self.loading.get_or_insert_with(LoadingSpec::default);
                if modifiers.contains("attr") {
                    loading.attr = Some(value);
                } else if modifiers.contains("class") {
                    loading.class = Some(value);
                    loading.remove_class = modifiers.contains("remove");
                } else if modifiers.contains("remove") {
                    loading.hide = true;
                } else {
                    loading.show = true;
                }
            }
            DirectiveKind::Target => self.target = Some(value),
            DirectiveKind::Key => self.key = Some(value),
            DirectiveKind::PrimaryKey => self.is_pk = true,
            DirectiveKind::Error => {
                self.is_error = true;
                if let Some((_, code)) = raw_name.split_once(":error:") {
                    self.errors.push(code.to_string());
                }
            }
            DirectiveKind::Action => {
                let Some(event_type) = event_type.filter(|e| !e.is_empty()) else {
                    return;
                };
                let mut action = Action {
                    name: value,
                    event_type,
                    is_prevent: false,
                    is_stop: false,
                    key: None,
                    debounce_time: debounce_arg(&modifiers),
                };
                for (modifier, _) in modifiers.iter() {
                    match modifier {
                        "prevent" => action.is_prevent = true,
                        "stop" => action.is_stop = true,
                        "debounce" => {}
                        // anything else names a key
                        key => action.key = Some(key.to_string()),
                    }
                }
                self.actions.push(action);
            }
            DirectiveKind::Unknown => {}
        }
    }

    /// Same physical node
    pub fn is_same(&self, other: &Element) -> bool {
        self.node == other.node
    }

    /// Debounce requested by this element's binding, or the sentinel
    pub fn debounce_time(&self) -> i64 {
        self.model.as_ref().map_or(DEFAULT_DEBOUNCE, |m| m.debounce_time)
    }

    /// Live value of the underlying control
    pub fn get_value(&self, document: &Document) -> ControlValue {
        document.control_value(self.node)
    }

    /// Nearest ancestor carrying a directive
    pub fn get_meld_parent(&self, document: &Document, config: &MeldConfig) -> Option<Element> {
        let mut cur = document.parent_element(self.node);
        while let Some(node) = cur {
            let parent = Element::new(document, node, config);
            if parent.is_meld {
                return Some(parent);
            }
            cur = document.parent_element(node);
        }
        None
    }

    pub fn hide(&self, document: &mut Document) {
        document.set_attr(self.node, "hidden", "");
    }

    pub fn show(&self, document: &mut Document) {
        document.remove_attr(self.node, "hidden");
    }

    /// Apply (or with `revert`, undo) this element's own `attr`/`class`
    /// loading directive.
    pub fn handle_loading(&self, document: &mut Document, revert: bool) {
        let Some(loading) = &self.loading else { return };

        if let Some(attr) = &loading.attr {
            if revert {
                document.remove_attr(self.node, attr);
            } else {
                document.set_attr(self.node, attr, attr);
            }
        }

        if let Some(class) = &loading.class {
            let classes: Vec<&str> = class.split_whitespace().collect();
            if revert != loading.remove_class {
                document.remove_classes(self.node, &classes);
            } else {
                document.add_classes(self.node, &classes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meld_dom::el;

    fn build(spec: meld_dom::ElementBuilder) -> (Document, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let node = doc.build(body, spec).unwrap();
        (doc, node)
    }

    fn facade(doc: &Document, node: NodeId) -> Element {
        Element::new(doc, node, &MeldConfig::default())
    }

    #[test]
    fn test_plain_element() {
        let (doc, node) = build(el("div").attr("class", "x"));
        let element = facade(&doc, node);
        assert!(!element.is_meld);
        assert!(element.model.is_none());
        assert!(element.actions.is_empty());
    }

    #[test]
    fn test_model_binding() {
        let (doc, node) = build(el("input").attr("meld:model.lazy.debounce-300", "title"));
        let model = facade(&doc, node).model.unwrap();
        assert_eq!(model.name, "title");
        assert_eq!(model.event_type, "blur");
        assert!(model.is_lazy);
        assert!(!model.is_defer);
        assert_eq!(model.debounce_time, 300);

        let (doc, node) = build(el("input").attr("meld:model.defer", "title"));
        let model = facade(&doc, node).model.unwrap();
        assert_eq!(model.event_type, "input");
        assert!(model.is_defer);
        assert_eq!(model.debounce_time, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_last_model_binding_wins() {
        let (doc, node) = build(el("input").attr("meld:model", "a").attr("meld:field", "b"));
        assert_eq!(facade(&doc, node).model.unwrap().name, "b");
    }

    #[test]
    fn test_actions() {
        let (doc, node) = build(
            el("input")
                .attr("meld:keyup.enter.prevent", "search")
                .attr("meld:click.stop", "select"),
        );
        let element = facade(&doc, node);
        assert!(element.is_meld);
        assert_eq!(element.actions.len(), 2);

        let search = &element.actions[0];
        assert_eq!(search.event_type, "keyup");
        assert_eq!(search.key.as_deref(), Some("enter"));
        assert!(search.is_prevent && !search.is_stop);

        let select = &element.actions[1];
        assert_eq!(select.name, "select");
        assert!(select.is_stop);
        assert_eq!(select.key, None);
    }

    #[test]
    fn test_loading_and_target() {
        let (doc, node) = build(
            el("span")
                .attr("meld:loading.remove", "")
                .attr("meld:target", "save-btn"),
        );
        let loading = facade(&doc, node).loading.unwrap();
        assert!(loading.hide && !loading.show);
        assert_eq!(loading.target.as_deref(), Some("save-btn"));

        let (doc, node) = build(el("span").attr("meld:loading", ""));
        let loading = facade(&doc, node).loading.unwrap();
        assert!(loading.show);
        assert_eq!(loading.target, None);
    }

    #[test]
    fn test_key_pk_error_poll() {
        let (doc, node) = build(
            el("div")
                .attr("meld:key", "row-1")
                .attr("meld:pk", "1")
                .attr("meld:error:required", "Required")
                .attr("meld:poll.5000", "tick"),
        );
        let element = facade(&doc, node);
        assert_eq!(element.key.as_deref(), Some("row-1"));
        assert!(element.is_pk);
        assert!(element.is_error);
        assert_eq!(element.errors, vec!["required".to_string()]);
        assert_eq!(
            element.poll,
            Some(PollSpec { method: "tick".into(), interval_ms: 5000, disabled: false })
        );

        let (doc, node) = build(el("div").attr("meld:poll", ""));
        let poll = facade(&doc, node).poll.unwrap();
        assert_eq!(poll.method, "refresh");
        assert_eq!(poll.interval_ms, 2000);

        let (doc, node) = build(el("div").attr("meld:poll-750.disable", "tick"));
        let poll = facade(&doc, node).poll.unwrap();
        assert_eq!(poll.interval_ms, 750);
        assert!(poll.disabled);

        let (doc, node) = build(el("div").attr("meld:poll.18446744073709551615", "tick"));
        assert_eq!(facade(&doc, node).poll.unwrap().interval_ms, MAX_POLL_MS);
    }

    #[test]
    fn test_meld_parent_and_identity() {
        let mut doc = Document::default();
        let body = doc.body();
        let button = doc
            .build(body, el("button").attr("meld:click", "save").child(el("i").attr("class", "icon")))
            .unwrap();
        let icon = doc.tree.children(button)[0];

        let parent = facade(&doc, icon).get_meld_parent(&doc, &MeldConfig::default()).unwrap();
        assert_eq!(parent.node, button);
        assert!(parent.is_same(&facade(&doc, button)));
        assert!(facade(&doc, body).get_meld_parent(&doc, &MeldConfig::default()).is_none());
    }

    #[test]
    fn test_hide_show_and_self_loading() {
        let (mut doc, node) = build(
            el("button")
                .attr("meld:loading.attr", "disabled")
                .attr("meld:loading.class", "busy spin"),
        );
        let element = facade(&doc, node);

        element.hide(&mut doc);
        assert!(doc.attr(node, "hidden").is_some());
        element.show(&mut doc);
        assert!(doc.attr(node, "hidden").is_none());

        element.handle_loading(&mut doc, false);
        assert_eq!(doc.attr(node, "disabled"), Some("disabled"));
        assert_eq!(doc.attr(node, "class"), Some("busy spin"));

        element.handle_loading(&mut doc, true);
        assert_eq!(doc.attr(node, "disabled"), None);
        assert_eq!(doc.attr(node, "class"), Some(""));
    }

    #[test]
    fn test_get_value() {
        let (doc, node) = build(el("input").attr("type", "checkbox").attr("checked", "").attr("meld:model", "ok"));
        assert_eq!(facade(&doc, node).get_value(&doc), ControlValue::Bool(true));
    }
}

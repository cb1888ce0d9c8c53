//! Loading Dispatch
//!
//! When an action fires, the acting element gets its own `attr`/`class`
//! loading state and every registered indicator aimed at it (or aimed at
//! nothing) is shown or hidden.

use meld_dom::{Document, NodeId};

use crate::element::Element;
use crate::listeners::ListenerRegistry;

/// Resolve the node a `meld:target` refers to: an id inside the component
/// root first, then a `meld:key`.
fn resolve_target(
    registry: &ListenerRegistry,
    document: &Document,
    root: NodeId,
    target: &str,
) -> Option<NodeId> {
    document
        .find(&format!("#{target}"), Some(root))
        .or_else(|| registry.key_element(target).map(|e| e.node))
}

/// Toggle loading state for an action fired on `acting`
pub fn apply_loading(
    registry: &ListenerRegistry,
    document: &mut Document,
    root: NodeId,
    acting: &Element,
) {
    acting.handle_loading(document, false);

    for loading_el in &registry.loading_els {
        let Some(loading) = &loading_el.loading else {
            continue;
        };

        if let Some(target) = &loading.target {
            match resolve_target(registry, document, root, target) {
                Some(node) if node == acting.node => {}
                Some(_) => continue,
                None => {
                    tracing::debug!("Loading target {:?} not found", target);
                    continue;
                }
            }
        }

        if loading.hide {
            loading_el.hide(document);
        } else if loading.show {
            loading_el.show(document);
        }
    }
}

/// Undo loading state once a response arrives. `acting` holds the elements
/// [`apply_loading`] set their own `attr`/`class` on; they may carry a model
/// binding and so be missing from the registry's loading list.
pub fn revert_loading(registry: &ListenerRegistry, document: &mut Document, acting: &[Element]) {
    for element in acting {
        if !registry.loading_els.iter().any(|e| e.is_same(element)) {
            element.handle_loading(document, true);
        }
    }

    for loading_el in &registry.loading_els {
        let Some(loading) = &loading_el.loading else {
            continue;
        };
        loading_el.handle_loading(document, true);
        if loading.hide {
            loading_el.show(document);
        }
        if loading.show {
            loading_el.hide(document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeldConfig;
    use meld_dom::el;

    struct Fixture {
        doc: Document,
        root: NodeId,
        registry: ListenerRegistry,
        save: NodeId,
        other: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::default();
        let body = doc.body();
        let root = doc
            .build(
                body,
                el("div")
                    .attr("meld:id", "1")
                    .child(el("button").attr("id", "save").attr("meld:click", "save"))
                    .child(el("button").attr("meld:key", "other").attr("meld:click", "other"))
                    .child(el("span").attr("class", "by-id").attr("meld:loading", "").attr("meld:target", "save"))
                    .child(el("span").attr("class", "by-key").attr("meld:loading", "").attr("meld:target", "other"))
                    .child(el("span").attr("class", "any").attr("meld:loading.remove", "")),
            )
            .unwrap();
        let mut registry = ListenerRegistry::new();
        registry.refresh(&mut doc, root, &MeldConfig::default());
        let save = doc.get_element_by_id("save").unwrap();
        let other = registry.key_element("other").unwrap().node;
        Fixture { doc, root, registry, save, other }
    }

    fn hidden(doc: &Document, class: &str) -> bool {
        let node = doc.find(&format!(".{class}"), None).unwrap();
        doc.attr(node, "hidden").is_some()
    }

    #[test]
    fn test_targeted_by_id() {
        let mut f = fixture();
        assert!(hidden(&f.doc, "by-id"));
        assert!(hidden(&f.doc, "by-key"));
        assert!(!hidden(&f.doc, "any"));

        let acting = Element::new(&f.doc, f.save, &MeldConfig::default());
        apply_loading(&f.registry, &mut f.doc, f.root, &acting);

        assert!(!hidden(&f.doc, "by-id"));
        assert!(hidden(&f.doc, "by-key"));
        assert!(hidden(&f.doc, "any"));

        revert_loading(&f.registry, &mut f.doc, &[acting]);
        assert!(!hidden(&f.doc, "any"));
        assert!(hidden(&f.doc, "by-id"));
    }

    #[test]
    fn test_targeted_by_key() {
        let mut f = fixture();
        let acting = Element::new(&f.doc, f.other, &MeldConfig::default());
        apply_loading(&f.registry, &mut f.doc, f.root, &acting);

        assert!(hidden(&f.doc, "by-id"));
        assert!(!hidden(&f.doc, "by-key"));
        assert!(hidden(&f.doc, "any"));
    }

    #[test]
    fn test_acting_element_attr() {
        let mut doc = Document::default();
        let body = doc.body();
        let root = doc
            .build(
                body,
                el("div")
                    .attr("meld:id", "1")
                    .child(el("button").attr("meld:click", "go").attr("meld:loading.attr", "disabled")),
            )
            .unwrap();
        let mut registry = ListenerRegistry::new();
        registry.refresh(&mut doc, root, &MeldConfig::default());

        let button = doc.tree.children(root)[0];
        let acting = Element::new(&doc, button, &MeldConfig::default());
        apply_loading(&registry, &mut doc, root, &acting);
        assert_eq!(doc.attr(button, "disabled"), Some("disabled"));

        revert_loading(&registry, &mut doc, &[acting]);
        assert_eq!(doc.attr(button, "disabled"), None);
    }

    #[test]
    fn test_model_bound_acting_element_reverts() {
        let mut doc = Document::default();
        let body = doc.body();
        let root = doc
            .build(
                body,
                el("div").attr("meld:id", "1").child(
                    el("input")
                        .attr("meld:model", "query")
                        .attr("meld:keyup.enter", "search")
                        .attr("meld:loading.attr", "readonly"),
                ),
            )
            .unwrap();
        let mut registry = ListenerRegistry::new();
        registry.refresh(&mut doc, root, &MeldConfig::default());
        assert!(registry.loading_els.is_empty());

        let input = doc.tree.children(root)[0];
        let acting = Element::new(&doc, input, &MeldConfig::default());
        apply_loading(&registry, &mut doc, root, &acting);
        assert_eq!(doc.attr(input, "readonly"), Some("readonly"));

        revert_loading(&registry, &mut doc, &[acting]);
        assert_eq!(doc.attr(input, "readonly"), None);
    }
}

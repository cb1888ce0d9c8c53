//! Document - High-level document API

use crate::{DOMTokenList, DomTree, NodeId, SimpleSelector};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with `<html><body></body></html>` structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let body = tree.create_element("body");
        tree.append_detached(tree.root(), html);
        tree.append_detached(html, body);

        Self {
            tree,
            url: url.to_string(),
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            body_element: NodeId::NONE,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// `<body>`, or the document node for empty documents
    pub fn body(&self) -> NodeId {
        if self.body_element.is_valid() {
            self.body_element
        } else {
            self.tree.root()
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// First element under `scope` (document when `None`) matching `selector`.
    /// The scope element itself is never returned, as with `querySelector`.
    pub fn find(&self, selector: &str, scope: Option<NodeId>) -> Option<NodeId> {
        let selector = SimpleSelector::parse(selector)?;
        self.find_matching(&selector, scope)
    }

    pub fn find_matching(&self, selector: &SimpleSelector, scope: Option<NodeId>) -> Option<NodeId> {
        let scope = scope.unwrap_or(self.tree.root());
        self.tree
            .descendants(scope)
            .into_iter()
            .find(|&id| self.tree.element(id).is_some_and(|e| selector.matches(e)))
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_matching(&SimpleSelector::Id(id.to_string()), None)
    }

    /// Visit every element below `root` in document order
    pub fn visit_descendants(&self, root: NodeId, mut visit: impl FnMut(NodeId)) {
        for id in self.tree.descendants(root) {
            visit(id);
        }
    }

    /// Nearest ancestor element of `node`
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node).filter(|&p| self.tree.element(p).is_some())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node)?.get_attr(name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.tree.element_mut(node) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.tree.element_mut(node) {
            el.remove_attr(name);
        }
    }

    pub fn class_list(&self, node: NodeId) -> DOMTokenList {
        DOMTokenList::from_string(self.attr(node, "class").unwrap_or_default())
    }

    pub fn add_classes(&mut self, node: NodeId, classes: &[&str]) {
        let mut list = self.class_list(node);
        list.add(classes);
        self.set_attr(node, "class", &list.value());
    }

    pub fn remove_classes(&mut self, node: NodeId, classes: &[&str]) {
        let mut list = self.class_list(node);
        list.remove(classes);
        self.set_attr(node, "class", &list.value());
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.tree.children(node) {
            match self.tree.get(child).and_then(|n| n.as_text()) {
                Some(text) => out.push_str(text),
                None => out.push_str(&self.text_content(child)),
            }
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::el;

    #[test]
    fn test_new_links_html_and_body() {
        let doc = Document::new("https://example.test/");
        let html = doc.tree.children(doc.tree.root());
        assert_eq!(html.len(), 1);
        assert_eq!(doc.tree.element(html[0]).map(|e| e.tag.as_str()), Some("html"));
        assert_eq!(doc.tree.children(html[0]), vec![doc.body()]);
        assert!(doc.tree.is_connected(doc.body()));
    }

    #[test]
    fn test_find_is_scoped_and_excludes_scope() {
        let mut doc = Document::default();
        let body = doc.body();
        let root = doc
            .build(body, el("div").attr("meld:id", "42").child(el("button").attr("id", "save")))
            .unwrap();

        let save = doc.get_element_by_id("save").unwrap();
        assert_eq!(doc.find(r#"[meld\:id="42"]"#, None), Some(root));
        assert_eq!(doc.find("#save", Some(root)), Some(save));
        assert_eq!(doc.find("#save", Some(save)), None);
        assert_eq!(doc.find(r#"[meld:id="42"]"#, Some(root)), None);
    }

    #[test]
    fn test_classes_round_trip_through_attribute() {
        let mut doc = Document::default();
        let body = doc.body();
        let div = doc.build(body, el("div").attr("class", "a")).unwrap();

        doc.add_classes(div, &["b", "c"]);
        assert_eq!(doc.attr(div, "class"), Some("a b c"));
        doc.remove_classes(div, &["a"]);
        assert_eq!(doc.attr(div, "class"), Some("b c"));
    }

    #[test]
    fn test_visit_descendants_order() {
        let mut doc = Document::default();
        let body = doc.body();
        let root = doc
            .build(body, el("ul").child(el("li").attr("id", "1")).child(el("li").attr("id", "2")))
            .unwrap();

        let mut seen = Vec::new();
        doc.visit_descendants(root, |id| seen.push(doc.attr(id, "id").map(str::to_string)));
        assert_eq!(seen, vec![Some("1".to_string()), Some("2".to_string())]);
        assert_eq!(doc.parent_element(root), Some(body));
    }
}

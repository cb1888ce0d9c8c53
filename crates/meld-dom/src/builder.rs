//! Element builder
//!
//! Declarative subtree construction, used by patchers to materialize a
//! fragment and by hosts to set up a page.

use crate::{Document, DomResult, NodeId};

/// A node to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    Element(ElementBuilder),
    Text(String),
}

/// Element description with attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBuilder {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeSpec>,
}

/// Start describing an element
pub fn el(tag: &str) -> ElementBuilder {
    ElementBuilder {
        tag: tag.to_string(),
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl ElementBuilder {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(NodeSpec::Element(child));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(NodeSpec::Text(text.to_string()));
        self
    }
}

impl Document {
    /// Create `spec` and append it under `parent`
    pub fn build(&mut self, parent: NodeId, spec: ElementBuilder) -> DomResult<NodeId> {
        let id = self.tree.create_element(&spec.tag);
        if let Some(el) = self.tree.element_mut(id) {
            for (name, value) in &spec.attrs {
                el.set_attr(name, value);
            }
        }
        self.tree.append_child(parent, id)?;

        for child in spec.children {
            match child {
                NodeSpec::Element(child) => {
                    self.build(id, child)?;
                }
                NodeSpec::Text(text) => {
                    let t = self.tree.create_text(&text);
                    self.tree.append_child(id, t)?;
                }
            }
        }
        Ok(id)
    }

    /// Drop every child of `parent` and build `children` in their place
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        children: Vec<ElementBuilder>,
    ) -> DomResult<Vec<NodeId>> {
        tracing::trace!("Replacing children of {:?} with {} nodes", parent, children.len());
        self.tree.remove_children(parent);
        children
            .into_iter()
            .map(|child| self.build(parent, child))
            .collect()
    }
}

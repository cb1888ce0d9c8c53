//! Form control values
//!
//! Reads the live value of `input`, `select` and `textarea` elements the way
//! a model binding sees it.

use crate::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Live value of a form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Bool(bool),
    List(Vec<String>),
    Text(String),
}

impl Default for ControlValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for ControlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Document {
    /// Value of a control: checkbox → checked state, multi-select → selected
    /// option values, anything else → its `value`.
    pub fn control_value(&self, node: NodeId) -> ControlValue {
        let Some(el) = self.tree.element(node) else {
            return ControlValue::default();
        };

        if el.tag == "input" && el.input_type().as_deref() == Some("checkbox") {
            return ControlValue::Bool(el.has_attr("checked"));
        }

        if el.tag == "select" && el.has_attr("multiple") {
            let selected = self
                .tree
                .descendants(node)
                .into_iter()
                .filter_map(|id| {
                    let option = self.tree.element(id)?;
                    (option.tag == "option" && option.has_attr("selected")).then(|| {
                        option
                            .get_attr("value")
                            .map(str::to_string)
                            .unwrap_or_else(|| self.text_content(id))
                    })
                })
                .collect();
            return ControlValue::List(selected);
        }

        match el.get_attr("value") {
            Some(value) => ControlValue::Text(value.to_string()),
            None if el.tag == "textarea" => ControlValue::Text(self.text_content(node)),
            None => ControlValue::default(),
        }
    }

    /// Write a value the way user input would
    pub fn set_control_value(&mut self, node: NodeId, value: ControlValue) {
        match value {
            ControlValue::Bool(checked) => {
                if let Some(el) = self.tree.element_mut(node) {
                    el.attrs.toggle_attribute("checked", Some(checked));
                }
            }
            ControlValue::List(values) => {
                for id in self.tree.descendants(node) {
                    let text = self.text_content(id);
                    if let Some(option) = self.tree.element_mut(id).filter(|e| e.tag == "option") {
                        let v = option.get_attr("value").map_or(text, str::to_string);
                        option.attrs.toggle_attribute("selected", Some(values.contains(&v)));
                    }
                }
            }
            ControlValue::Text(text) => {
                if let Some(el) = self.tree.element_mut(node) {
                    el.set_attr("value", &text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::el;

    #[test]
    fn test_checkbox_value() {
        let mut doc = Document::empty("about:blank");
        let root = doc.tree.root();
        let cb = doc.build(root, el("input").attr("type", "checkbox")).unwrap();

        assert_eq!(doc.control_value(cb), ControlValue::Bool(false));
        doc.set_control_value(cb, ControlValue::Bool(true));
        assert_eq!(doc.control_value(cb), ControlValue::Bool(true));
    }

    #[test]
    fn test_multi_select_value() {
        let mut doc = Document::empty("about:blank");
        let root = doc.tree.root();
        let select = doc
            .build(
                root,
                el("select")
                    .attr("multiple", "")
                    .child(el("option").attr("value", "a").attr("selected", ""))
                    .child(el("option").attr("value", "b"))
                    .child(el("option").attr("selected", "").text("c")),
            )
            .unwrap();

        assert_eq!(
            doc.control_value(select),
            ControlValue::List(vec!["a".into(), "c".into()])
        );

        doc.set_control_value(select, ControlValue::List(vec!["b".into()]));
        assert_eq!(doc.control_value(select), ControlValue::List(vec!["b".into()]));
    }

    #[test]
    fn test_text_value() {
        let mut doc = Document::empty("about:blank");
        let root = doc.tree.root();
        let input = doc.build(root, el("input").attr("value", "hello")).unwrap();
        let area = doc.build(root, el("textarea").text("notes")).unwrap();
        let div = doc.build(root, el("div")).unwrap();

        assert_eq!(doc.control_value(input), ControlValue::from("hello"));
        assert_eq!(doc.control_value(area), ControlValue::from("notes"));
        assert_eq!(doc.control_value(div), ControlValue::from(""));
    }

    #[test]
    fn test_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ControlValue::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&ControlValue::from("x")).unwrap(), "\"x\"");
    }
}

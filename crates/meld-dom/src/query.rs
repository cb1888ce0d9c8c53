//! Element Query
//!
//! The subset of selectors the runtime needs: `#id`, `.class`, `tag`, `*`
//! and `[name]` / `[name="value"]`.

use crate::{DOMTokenList, ElementData};

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Attr { name: String, value: Option<String> },
    Universal,
}

impl SimpleSelector {
    /// Parse a simple selector string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if s == "*" {
            Some(Self::Universal)
        } else if let Some(id) = s.strip_prefix('#') {
            Some(Self::Id(id.to_string()))
        } else if let Some(class) = s.strip_prefix('.') {
            Some(Self::Class(class.to_string()))
        } else if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(Self::parse_attr(inner))
        } else {
            Some(Self::Tag(s.to_ascii_lowercase()))
        }
    }

    fn parse_attr(inner: &str) -> Self {
        match inner.split_once('=') {
            Some((name, value)) => {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                Self::Attr {
                    // `meld\:id` escaping as written for querySelector
                    name: name.trim().replace("\\:", ":"),
                    value: Some(value.to_string()),
                }
            }
            None => Self::Attr {
                name: inner.trim().replace("\\:", ":"),
                value: None,
            },
        }
    }

    /// Selector matching `[name="value"]`
    pub fn attr(name: &str, value: &str) -> Self {
        Self::Attr {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element
                .get_attr("class")
                .is_some_and(|c| DOMTokenList::from_string(c).contains(class)),
            Self::Attr { name, value } => match (element.get_attr(name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_selector_parse() {
        assert!(matches!(SimpleSelector::parse("div"), Some(SimpleSelector::Tag(_))));
        assert!(matches!(SimpleSelector::parse(".class"), Some(SimpleSelector::Class(_))));
        assert!(matches!(SimpleSelector::parse("#id"), Some(SimpleSelector::Id(_))));
        assert!(matches!(SimpleSelector::parse("*"), Some(SimpleSelector::Universal)));
        assert_eq!(SimpleSelector::parse(""), None);
    }

    #[test]
    fn test_attr_selector_unescapes_namespace() {
        assert_eq!(
            SimpleSelector::parse(r#"[meld\:id="42"]"#),
            Some(SimpleSelector::attr("meld:id", "42"))
        );
        assert_eq!(
            SimpleSelector::parse("[hidden]"),
            Some(SimpleSelector::Attr { name: "hidden".into(), value: None })
        );
    }

    #[test]
    fn test_element_matches() {
        let mut el = ElementData::new("DIV");
        el.set_attr("id", "main");
        el.set_attr("class", "container active");
        el.set_attr("meld:id", "42");

        assert!(SimpleSelector::Tag("div".into()).matches(&el));
        assert!(SimpleSelector::Id("main".into()).matches(&el));
        assert!(SimpleSelector::Class("active".into()).matches(&el));
        assert!(SimpleSelector::attr("meld:id", "42").matches(&el));
        assert!(!SimpleSelector::attr("meld:id", "4").matches(&el));
    }
}

//! Element Attributes
//!
//! Attributes are kept in source order, since directive folding reads them
//! front to back. Elements carry a handful of attributes, so lookups scan.

/// Attribute list of one element
#[derive(Debug, Clone, Default)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
}

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl NamedNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.attributes[i].value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Overwrite in place, or append a new attribute at the end
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.attributes[i].value = value.to_string(),
            None => self.attributes.push(Attr {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Remove by name, returning the removed attribute
    pub fn remove_named_item(&mut self, name: &str) -> Option<Attr> {
        let index = self.position(name)?;
        Some(self.attributes.remove(index))
    }

    /// Add or remove a boolean attribute; `force` pins the outcome
    pub fn toggle_attribute(&mut self, name: &str, force: Option<bool>) -> bool {
        let present = self.has_attribute(name);
        let on = force.unwrap_or(!present);
        match (on, present) {
            (true, false) => self.set_attribute(name, ""),
            (false, true) => {
                self.remove_named_item(name);
            }
            _ => {}
        }
        on
    }

    /// Attributes in source order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("meld:model", "a");
        attrs.set_attribute("class", "btn");
        attrs.set_attribute("meld:model", "b");

        assert_eq!(attrs.len(), 2);
        let pairs: Vec<_> = attrs.iter().map(|a| (a.name.as_str(), a.value.as_str())).collect();
        assert_eq!(pairs, [("meld:model", "b"), ("class", "btn")]);
    }

    #[test]
    fn test_remove() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("a", "1");
        attrs.set_attribute("b", "2");

        assert_eq!(attrs.remove_named_item("a").map(|a| a.value), Some("1".to_string()));
        assert!(attrs.remove_named_item("a").is_none());
        assert_eq!(attrs.get_attribute("b"), Some("2"));
    }

    #[test]
    fn test_toggle_attribute() {
        let mut attrs = NamedNodeMap::new();

        assert!(attrs.toggle_attribute("hidden", None));
        assert!(attrs.has_attribute("hidden"));
        assert!(!attrs.toggle_attribute("hidden", None));
        assert!(!attrs.has_attribute("hidden"));

        attrs.toggle_attribute("checked", Some(true));
        attrs.toggle_attribute("checked", Some(true));
        assert_eq!(attrs.len(), 1);
    }
}

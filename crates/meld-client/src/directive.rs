//! Directive Parser
//!
//! Classifies one DOM attribute into a [`Directive`]. Classification runs an
//! ordered rule table over the attribute name and the first matching rule
//! wins, so a name containing two rule tokens (`meld:field-loading`) resolves
//! by table position, not by specificity.

use crate::MeldConfig;

/// What a namespaced attribute declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Model,
    Field,
    Db,
    Poll,
    Loading,
    Target,
    Key,
    PrimaryKey,
    Error,
    Action,
    /// Not namespaced, or a reserved name such as `meld:id`
    Unknown,
}

/// Value of a modifier segment: `.prevent` is a flag, `.debounce-300` has an argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Flag,
    Arg(String),
}

/// Modifiers in discovery order. Re-inserting a name keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(Vec<(String, Modifier)>);

impl Modifiers {
    pub fn insert(&mut self, name: &str, value: Modifier) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Modifier> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Argument of `name`, if it was given one
    pub fn arg(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Modifier::Arg(arg) => Some(arg),
            Modifier::Flag => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Modifier)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Substring of the full attribute name
    Contains(&'static str),
    /// Exact un-prefixed name
    Equals(&'static str),
}

impl Rule {
    fn matches(self, name: &str, local: &str) -> bool {
        match self {
            Rule::Contains(token) => name.contains(token),
            Rule::Equals(token) => local == token,
        }
    }
}

/// Evaluated top to bottom; everything else namespaced is an action
const RULES: [(Rule, DirectiveKind); 9] = [
    (Rule::Contains(":model"), DirectiveKind::Model),
    (Rule::Contains(":field"), DirectiveKind::Field),
    (Rule::Contains(":db"), DirectiveKind::Db),
    (Rule::Contains(":poll"), DirectiveKind::Poll),
    (Rule::Contains(":loading"), DirectiveKind::Loading),
    (Rule::Contains(":target"), DirectiveKind::Target),
    (Rule::Equals("key"), DirectiveKind::Key),
    (Rule::Equals("pk"), DirectiveKind::PrimaryKey),
    (Rule::Contains(":error:"), DirectiveKind::Error),
];

/// One parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub raw_name: String,
    pub raw_value: String,
    /// Name carries the namespace prefix
    pub is_meld: bool,
    pub kind: DirectiveKind,
    /// Only set for [`DirectiveKind::Action`]
    pub event_type: Option<String>,
    pub modifiers: Modifiers,
}

impl Directive {
    /// Parse with the default `meld` namespace
    pub fn parse(name: &str, value: &str) -> Self {
        Self::parse_with(&MeldConfig::default(), name, value)
    }

    pub fn parse_with(config: &MeldConfig, name: &str, value: &str) -> Self {
        let mut directive = Self {
            raw_name: name.to_string(),
            raw_value: value.to_string(),
            is_meld: false,
            kind: DirectiveKind::Unknown,
            event_type: None,
            modifiers: Modifiers::default(),
        };

        let Some(local) = name.strip_prefix(config.prefix().as_str()) else {
            return directive;
        };
        directive.is_meld = true;

        match RULES.iter().find(|(rule, _)| rule.matches(name, local)) {
            Some(&(_, kind)) => directive.kind = kind,
            None if config.reserved_names.iter().any(|r| r == local) => {}
            None => {
                directive.kind = DirectiveKind::Action;
                directive.event_type = Some(local.to_string());
            }
        }

        let subject = directive.event_type.clone().unwrap_or_else(|| name.to_string());
        for segment in subject.split('.').skip(1) {
            match segment.split_once('-') {
                Some((modifier, arg)) => directive.modifiers.insert(modifier, Modifier::Arg(arg.to_string())),
                None => directive.modifiers.insert(segment, Modifier::Flag),
            }

            if let Some(event_type) = directive.event_type.as_mut() {
                *event_type = event_type.replacen(&format!(".{segment}"), "", 1);
            }
        }

        directive
    }

    /// Name without the namespace prefix
    pub fn local_name<'a>(&'a self, config: &MeldConfig) -> &'a str {
        self.raw_name
            .strip_prefix(config.prefix().as_str())
            .unwrap_or(&self.raw_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        let cases = [
            ("meld:model.lazy", DirectiveKind::Model),
            ("meld:field", DirectiveKind::Field),
            ("meld:db", DirectiveKind::Db),
            ("meld:poll.5000", DirectiveKind::Poll),
            ("meld:loading.remove", DirectiveKind::Loading),
            ("meld:target", DirectiveKind::Target),
            ("meld:key", DirectiveKind::Key),
            ("meld:pk", DirectiveKind::PrimaryKey),
            ("meld:error:required", DirectiveKind::Error),
            ("meld:click", DirectiveKind::Action),
            // first rule in the table wins over the more specific one
            ("meld:field.loading", DirectiveKind::Field),
            ("meld:model:error:x", DirectiveKind::Model),
            ("meld:dblclick", DirectiveKind::Db),
        ];
        for (name, kind) in cases {
            assert_eq!(Directive::parse(name, "").kind, kind, "{name}");
        }
    }

    #[test]
    fn test_action_with_modifier() {
        let d = Directive::parse("meld:click.prevent", "save");
        assert_eq!(d.kind, DirectiveKind::Action);
        assert_eq!(d.event_type.as_deref(), Some("click"));
        assert_eq!(d.modifiers.get("prevent"), Some(&Modifier::Flag));
        assert_eq!(d.modifiers.len(), 1);
        assert_eq!(d.raw_value, "save");
    }

    #[test]
    fn test_modifier_arguments() {
        let d = Directive::parse("meld:keyup.debounce-300", "search");
        assert_eq!(d.event_type.as_deref(), Some("keyup"));
        assert_eq!(d.modifiers.arg("debounce"), Some("300"));

        // split happens on the first hyphen only
        let d = Directive::parse("meld:keyup.debounce-3-4", "search");
        assert_eq!(d.modifiers.arg("debounce"), Some("3-4"));
    }

    #[test]
    fn test_modifiers_stripped_left_to_right() {
        let d = Directive::parse("meld:keydown.enter.prevent.stop", "go");
        assert_eq!(d.event_type.as_deref(), Some("keydown"));
        let names: Vec<_> = d.modifiers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["enter", "prevent", "stop"]);
    }

    #[test]
    fn test_non_action_modifiers_come_from_full_name() {
        let d = Directive::parse("meld:model.defer.debounce-50", "name");
        assert_eq!(d.event_type, None);
        assert!(d.modifiers.contains("defer"));
        assert_eq!(d.modifiers.arg("debounce"), Some("50"));
    }

    #[test]
    fn test_reserved_names_never_become_event_types() {
        for name in ["meld:id", "meld:name", "meld:checksum"] {
            let d = Directive::parse(name, "x");
            assert!(d.is_meld);
            assert_eq!(d.event_type, None, "{name}");
            assert_eq!(d.kind, DirectiveKind::Unknown);
        }
    }

    #[test]
    fn test_non_namespaced() {
        let d = Directive::parse("class", "btn");
        assert!(!d.is_meld);
        assert_eq!(d.kind, DirectiveKind::Unknown);
        assert!(d.modifiers.is_empty());

        let d = Directive::parse("data-meld:click", "x");
        assert!(!d.is_meld);
    }

    #[test]
    fn test_custom_namespace() {
        let config = MeldConfig {
            namespace: "u".into(),
            ..MeldConfig::default()
        };
        let d = Directive::parse_with(&config, "u:click.stop", "go");
        assert_eq!(d.event_type.as_deref(), Some("click"));
        assert_eq!(d.local_name(&config), "click.stop");
        assert!(!Directive::parse_with(&config, "meld:click", "go").is_meld);
    }
}

//! Query parameter classification for product URLs.
//!
//! Parameters are either option selections (their name is a declared
//! option), tracking noise that must not survive canonicalization, or
//! anything else, which is carried through untouched.

use crate::shopify::ProductOption;

use super::Selection;

/// A named family of query parameters that never reach a canonical URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenyRule {
    /// What the parameters are, for logs.
    pub label: &'static str,
    /// Parameter name prefix, matched case-insensitively.
    pub prefix: &'static str,
}

impl DenyRule {
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        name.as_bytes()
            .get(..self.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(self.prefix.as_bytes()))
    }
}

/// Parameters dropped from product URLs.
pub const DENY_RULES: &[DenyRule] = &[
    DenyRule { label: "search session", prefix: "_sid" },
    DenyRule { label: "search position", prefix: "_pos" },
    DenyRule { label: "search query", prefix: "_psq" },
    DenyRule { label: "search surface", prefix: "_ss" },
    DenyRule { label: "search version", prefix: "_v" },
    DenyRule { label: "facebook click id", prefix: "fbclid" },
    DenyRule { label: "google click id", prefix: "gclid" },
    DenyRule { label: "campaign tag", prefix: "utm_" },
    DenyRule { label: "pagination cursor", prefix: "cursor" },
    DenyRule { label: "pagination direction", prefix: "direction" },
];

/// How one query parameter is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass<'a> {
    /// Dropped by a deny rule.
    Denied(&'static DenyRule),
    /// Selects a value of this product option.
    Option(&'a ProductOption),
    /// Preserved as-is after the option parameters.
    Passthrough,
}

/// Classifies query parameters against a deny list and a product's options.
#[derive(Debug, Clone, Copy)]
pub struct ParamFilter {
    rules: &'static [DenyRule],
}

impl Default for ParamFilter {
    fn default() -> Self {
        Self::new(DENY_RULES)
    }
}

impl ParamFilter {
    #[must_use]
    pub const fn new(rules: &'static [DenyRule]) -> Self {
        Self { rules }
    }

    /// Classify a parameter name. Deny rules win over option names.
    #[must_use]
    pub fn classify<'a>(&self, name: &str, options: &'a [ProductOption]) -> ParamClass<'a> {
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(name)) {
            return ParamClass::Denied(rule);
        }
        options
            .iter()
            .find(|option| option.name == name)
            .map_or(ParamClass::Passthrough, ParamClass::Option)
    }

    /// Split query pairs into the option selection and the parameters to
    /// preserve.
    ///
    /// The first occurrence of an option name wins. Values are matched to
    /// the declared spelling case-insensitively; values the option does not
    /// declare are kept verbatim so resolution can reject them.
    #[must_use]
    pub fn split(
        &self,
        pairs: impl IntoIterator<Item = (String, String)>,
        options: &[ProductOption],
    ) -> (Selection, Vec<(String, String)>) {
        let mut selection = Selection::new();
        let mut preserved = Vec::new();

        for (name, value) in pairs {
            match self.classify(&name, options) {
                ParamClass::Denied(rule) => {
                    tracing::trace!(param = %name, rule = rule.label, "Dropping query parameter");
                }
                ParamClass::Option(option) => {
                    let value = option
                        .values
                        .iter()
                        .find(|declared| declared.eq_ignore_ascii_case(&value))
                        .cloned()
                        .unwrap_or(value);
                    selection.insert(name, value);
                }
                ParamClass::Passthrough => preserved.push((name, value)),
            }
        }

        (selection, preserved)
    }
}

//! Variant resolution for product pages.
//!
//! A product page request carries the product handle in the path and the
//! shopper's option choices in the query string. This module turns those
//! into a concrete variant, a canonical URL and the availability of every
//! other option value:
//!
//! - [`params`] splits query parameters into option selections, parameters
//!   to preserve and tracking parameters to drop
//! - [`resolver`] maps a selection to a variant or a redirect
//! - [`canonical`] builds canonical product URLs
//! - [`availability`] marks which option values lead to a real variant

pub mod availability;
pub mod canonical;
pub mod params;
pub mod resolver;

pub use availability::{OptionAvailability, OptionValueAvailability, option_availability};
pub use canonical::{canonical_url, canonicalize, variant_path};
pub use params::{DENY_RULES, DenyRule, ParamClass, ParamFilter};
pub use resolver::{Resolution, ResolveError, resolve};

use crate::shopify::{ProductOption, SelectedOption};

/// An option-name to value mapping, kept in insertion order.
///
/// Names are unique. Two selections are compared as unordered sets.
#[derive(Debug, Clone, Default)]
pub struct Selection(Vec<SelectedOption>);

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a pair unless the name is already selected.
    ///
    /// Returns `false` when an earlier value for `name` was kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.0.push(SelectedOption::new(name, value));
        true
    }

    /// The value selected for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedOption> {
        self.0.iter()
    }

    /// Whether `options` holds exactly the same name/value pairs, in any order.
    #[must_use]
    pub fn matches(&self, options: &[SelectedOption]) -> bool {
        self.0.len() == options.len()
            && options
                .iter()
                .all(|o| self.get(&o.name) == Some(o.value.as_str()))
    }

    /// Reorder to follow the product's option declaration order.
    ///
    /// Names the product does not declare keep their relative order after
    /// the declared ones.
    #[must_use]
    pub fn in_option_order(&self, options: &[ProductOption]) -> Self {
        let mut ordered: Vec<SelectedOption> = options
            .iter()
            .filter_map(|option| {
                self.get(&option.name)
                    .map(|value| SelectedOption::new(option.name.clone(), value))
            })
            .collect();
        ordered.extend(
            self.0
                .iter()
                .filter(|o| !options.iter().any(|option| option.name == o.name))
                .cloned(),
        );
        Self(ordered)
    }

    /// A copy with `name` set to `value`, replacing any existing value in place.
    #[must_use]
    pub fn with(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        match next.0.iter_mut().find(|o| o.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => next.0.push(SelectedOption::new(name, value)),
        }
        next
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for Selection {}

impl From<&[SelectedOption]> for Selection {
    fn from(options: &[SelectedOption]) -> Self {
        let mut selection = Self::new();
        for option in options {
            selection.insert(option.name.clone(), option.value.clone());
        }
        selection
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SelectedOption;
    type IntoIter = std::slice::Iter<'a, SelectedOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! Which option values lead to an existing variant.

use serde::Serialize;

use crate::shopify::Product;

use super::{Selection, canonical_url};

/// One clickable option value.
#[derive(Debug, Clone, Serialize)]
pub struct OptionValueAvailability {
    pub value: String,
    /// Some variant matches the selection with this value substituted.
    pub available: bool,
    /// This is the currently selected value.
    pub active: bool,
    /// Canonical URL of the substituted selection.
    pub url: String,
}

/// An option with the state of each of its values.
#[derive(Debug, Clone, Serialize)]
pub struct OptionAvailability {
    pub name: String,
    pub values: Vec<OptionValueAvailability>,
}

/// Compute availability for every value of every option.
///
/// A value is available when some variant carries every pair of the
/// substituted selection. Whether that variant is in stock does not matter.
#[must_use]
pub fn option_availability(
    product: &Product,
    selection: &Selection,
    path: &str,
    preserved: &[(String, String)],
) -> Vec<OptionAvailability> {
    product
        .options
        .iter()
        .map(|option| OptionAvailability {
            name: option.name.clone(),
            values: option
                .values
                .iter()
                .map(|value| {
                    let candidate = selection.with(&option.name, value);
                    let available = product.variants.iter().any(|variant| {
                        candidate.iter().all(|pair| {
                            variant
                                .selected_options
                                .iter()
                                .any(|o| o.name == pair.name && o.value == pair.value)
                        })
                    });
                    OptionValueAvailability {
                        value: value.clone(),
                        available,
                        active: selection.get(&option.name) == Some(value.as_str()),
                        url: canonical_url(path, &candidate, &product.options, preserved),
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::frame_a;

    fn state<'a>(options: &'a [OptionAvailability], name: &str, value: &str) -> &'a OptionValueAvailability {
        options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.values.iter().find(|v| v.value == value))
            .unwrap_or_else(|| panic!("missing {name}={value}"))
    }

    #[test]
    fn test_missing_combination_is_unavailable() {
        let product = frame_a();
        let mut selection = Selection::new();
        selection.insert("Color", "Tortoise");
        selection.insert("Size", "Small");

        let options = option_availability(&product, &selection, "/products/frame-a", &[]);

        let large = state(&options, "Size", "Large");
        assert!(!large.available);
        assert_eq!(large.url, "/products/frame-a?Color=Tortoise&Size=Large");

        let small = state(&options, "Size", "Small");
        assert!(small.available);
        assert!(small.active);

        assert!(state(&options, "Color", "Black").available);
    }

    #[test]
    fn test_sold_out_variant_counts_as_available() {
        let product = frame_a();
        let mut selection = Selection::new();
        selection.insert("Color", "Black");
        selection.insert("Size", "Small");

        let options = option_availability(&product, &selection, "/products/frame-a", &[]);

        let tortoise = state(&options, "Color", "Tortoise");
        assert!(tortoise.available);
        assert!(!tortoise.active);
    }
}

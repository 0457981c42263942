//! Map an option selection to a product variant.

use thiserror::Error;

use crate::shopify::{DEFAULT_OPTION_VALUE, Product, ProductVariant};

use super::Selection;

/// Why a product page cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("product {0} has no variants")]
    NoVariants(String),

    /// The first variant's own selection does not resolve, so redirecting
    /// to it would loop.
    #[error("product {0} has inconsistent variant options")]
    Unresolvable(String),
}

/// Outcome of resolving a selection.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// The selected variant, or `None` when the page must redirect.
    pub variant: Option<&'a ProductVariant>,
    /// The selection the canonical URL carries, in declared option order.
    pub selection: Selection,
    /// Whether the request should be redirected to the canonical selection.
    pub redirect_needed: bool,
}

/// Whether the product has no real options.
fn is_degenerate(product: &Product) -> bool {
    match product.options.as_slice() {
        [] => true,
        [only] => only.values.len() == 1 && only.values.first().is_some_and(|v| v == DEFAULT_OPTION_VALUE),
        _ => false,
    }
}

/// Whether `selection` names every option exactly once with a declared value.
fn is_full_valid(product: &Product, selection: &Selection) -> bool {
    selection.len() == product.options.len()
        && product.options.iter().all(|option| {
            selection
                .get(&option.name)
                .is_some_and(|value| option.values.iter().any(|v| v == value))
        })
}

/// Resolve a selection against a product.
///
/// # Errors
///
/// `NoVariants` when the product has nothing to sell, `Unresolvable` when
/// the fallback redirect would point back at the same selection.
pub fn resolve<'a>(
    product: &'a Product,
    selection: &Selection,
) -> Result<Resolution<'a>, ResolveError> {
    let Some(first) = product.variants.first() else {
        return Err(ResolveError::NoVariants(product.handle.clone()));
    };

    if is_degenerate(product) || (selection.is_empty() && first.is_default()) {
        return Ok(Resolution {
            variant: Some(first),
            selection: Selection::new(),
            redirect_needed: false,
        });
    }

    if is_full_valid(product, selection)
        && let Some(variant) = product
            .variants
            .iter()
            .find(|v| selection.matches(&v.selected_options))
    {
        return Ok(Resolution {
            variant: Some(variant),
            selection: selection.in_option_order(&product.options),
            redirect_needed: false,
        });
    }

    let fallback = Selection::from(first.selected_options.as_slice()).in_option_order(&product.options);
    if &fallback == selection {
        tracing::warn!(handle = %product.handle, "First variant does not resolve to itself");
        return Err(ResolveError::Unresolvable(product.handle.clone()));
    }

    Ok(Resolution {
        variant: None,
        selection: fallback,
        redirect_needed: true,
    })
}

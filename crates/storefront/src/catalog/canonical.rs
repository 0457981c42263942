//! Canonical product URLs.

use url::form_urlencoded;

use crate::shopify::{ProductOption, SelectedOption};

use super::{ParamFilter, Selection};

/// Build `path?Option=Value&…` with options in declared order, then the
/// preserved parameters in their original order.
#[must_use]
pub fn canonical_url(
    path: &str,
    selection: &Selection,
    options: &[ProductOption],
    preserved: &[(String, String)],
) -> String {
    let ordered = selection.in_option_order(options);
    let mut query = form_urlencoded::Serializer::new(String::new());
    for option in &ordered {
        query.append_pair(&option.name, &option.value);
    }
    for (name, value) in preserved {
        query.append_pair(name, value);
    }
    let query = query.finish();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Re-derive the canonical form of an existing path and query.
///
/// Applying this to its own output returns the same string.
#[must_use]
pub fn canonicalize(path_and_query: &str, options: &[ProductOption]) -> String {
    let (path, query) = path_and_query
        .split_once('?')
        .unwrap_or((path_and_query, ""));
    let pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()));
    let (selection, preserved) = ParamFilter::default().split(pairs, options);
    canonical_url(path, &selection, options, &preserved)
}

/// Link to a variant's product page.
///
/// Placeholder `Title: Default Title` variants link to the bare product
/// path.
#[must_use]
pub fn variant_path(handle: &str, selected_options: &[SelectedOption]) -> String {
    let path = format!("/products/{handle}");
    if selected_options.iter().any(SelectedOption::is_default) {
        return path;
    }
    let mut query = form_urlencoded::Serializer::new(String::new());
    for option in selected_options {
        query.append_pair(&option.name, &option.value);
    }
    let query = query.finish();
    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

//! Product route handlers.
//!
//! The product page resolves the shopper's option selection before
//! rendering: a selection that names no existing variant redirects to the
//! canonical selection, and every rendered page links its canonical URL.
//! Recommendations are not awaited here; the page requests them as a
//! separate fragment once it has painted.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::catalog::{
    OptionAvailability, ParamFilter, canonical_url, option_availability, resolve, variant_path,
};
use crate::error::Result;
use crate::filters;
use crate::routes::found;
use crate::routes::layout::PageContext;
use crate::shopify::{Image, Product, ProductRecommendationIntent, ProductSummary, ProductVariant};
use crate::state::AppState;

/// Most recommendations shown under a product.
const RECOMMENDATION_LIMIT: usize = 4;

/// Selected variant display data for templates.
#[derive(Debug, Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub available: bool,
    pub sku: Option<String>,
}

impl From<&ProductVariant> for VariantView {
    fn from(variant: &ProductVariant) -> Self {
        Self {
            id: variant.id.to_string(),
            title: variant.title.clone(),
            price: variant.price.display(),
            compare_at_price: variant
                .on_sale()
                .then(|| variant.compare_at_price.as_ref().map(noh_core::Money::display))
                .flatten(),
            available: variant.available_for_sale,
            sku: variant.sku.clone(),
        }
    }
}

/// Product card used in grids and recommendations.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub title: String,
    pub url: String,
    pub price: String,
    pub image: Option<Image>,
    pub hover_image: Option<Image>,
}

impl From<&ProductSummary> for ProductCard {
    fn from(product: &ProductSummary) -> Self {
        let min = &product.price_range.min_variant_price;
        let max = &product.price_range.max_variant_price;
        let price = if min.amount == max.amount {
            min.display_compact()
        } else {
            format!("From {}", min.display_compact())
        };
        Self {
            title: product.title.clone(),
            url: variant_path(&product.handle, &product.first_variant_options),
            price,
            image: product.images.first().cloned(),
            hover_image: product.images.get(1).cloned(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
    pub canonical_url: String,
    pub options: Vec<OptionAvailability>,
    pub variant: Option<VariantView>,
    pub gallery: Vec<Image>,
    pub recommendations_url: String,
}

impl ProductShowTemplate {
    /// Whether the add-to-cart button is enabled.
    #[must_use]
    pub fn can_add_to_cart(&self) -> bool {
        self.variant.as_ref().is_some_and(|v| v.available)
    }
}

/// Recommendations fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/recommendations.html")]
pub struct RecommendationsTemplate {
    pub products: Vec<ProductCard>,
}

/// Images for the selected variant: its own image first, then product
/// images that are not tied to another variant's alt text.
fn gallery(product: &Product, variant: Option<&ProductVariant>) -> Vec<Image> {
    let Some(lead) = variant.and_then(|v| v.image.as_ref()) else {
        return product.images.clone();
    };
    let lead_alt = lead.alt_text.as_deref().unwrap_or_default();

    let mut images = vec![lead.clone()];
    images.extend(
        product
            .images
            .iter()
            .filter(|image| image.url != lead.url)
            .filter(|image| {
                let alt = image.alt_text.as_deref().unwrap_or_default();
                alt.is_empty() || alt == lead_alt
            })
            .cloned(),
    );
    images
}

/// Display product detail page.
///
/// Redirects (302) to the canonical selection when the query does not name
/// an existing variant.
#[instrument(skip(state, params, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    page: PageContext,
) -> Result<Response> {
    let product = state.storefront().get_product(&handle).await?;

    let (selection, preserved) = ParamFilter::default().split(params, &product.options);
    let resolution = resolve(&product, &selection)?;

    let path = format!("/products/{handle}");
    let canonical = canonical_url(&path, &resolution.selection, &product.options, &preserved);

    if resolution.redirect_needed {
        tracing::debug!(location = %canonical, "Redirecting to canonical selection");
        return Ok(found(&canonical));
    }

    let template = ProductShowTemplate {
        page,
        canonical_url: format!(
            "{}{}",
            state.config().base_url.trim_end_matches('/'),
            canonical_url(&path, &resolution.selection, &product.options, &[])
        ),
        options: option_availability(&product, &resolution.selection, &path, &preserved),
        variant: resolution.variant.map(VariantView::from),
        gallery: gallery(&product, resolution.variant),
        recommendations_url: format!("{path}/recommendations"),
        product: product.clone(),
    };

    Ok(template.into_response())
}

/// Recommendations fragment (HTMX, requested when scrolled into view).
///
/// Failures render an empty fragment; the product page is already shown.
#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> impl IntoResponse {
    let products = match state.storefront().get_product(&handle).await {
        Ok(product) => state
            .storefront()
            .get_product_recommendations(&product.id, ProductRecommendationIntent::Related)
            .await
            .map(|recs| {
                recs.iter()
                    .filter(|p| p.id != product.id)
                    .take(RECOMMENDATION_LIMIT)
                    .map(ProductCard::from)
                    .collect()
            }),
        Err(e) => Err(e),
    };

    let products = products.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load recommendations");
        Vec::new()
    });

    RecommendationsTemplate { products }
}

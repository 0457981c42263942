//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! camelCase response types in `storefront::queries`.

use noh_core::{CartId, CartLineId, CollectionId, Money, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Option name Shopify gives products that have no real options.
pub const DEFAULT_OPTION_NAME: &str = "Title";

/// Value Shopify gives the single variant of an option-less product.
pub const DEFAULT_OPTION_VALUE: &str = "Default Title";

// =============================================================================
// Shared Types
// =============================================================================

/// Product, variant or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Shopify image ID.
    pub id: Option<String>,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

/// Price range for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// Relay-style pagination info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Which page of a connection to request.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq)]
pub enum PageRequest {
    /// The first page.
    #[default]
    First,
    /// The page after this cursor.
    After(String),
    /// The page before this cursor.
    Before(String),
}

// =============================================================================
// Product Types
// =============================================================================

/// A name/value pair selecting one value of one product option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Color").
    pub name: String,
    /// Selected value (e.g., "Tortoise").
    pub value: String,
}

impl SelectedOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this is Shopify's `Title: Default Title` placeholder.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_OPTION_NAME && self.value == DEFAULT_OPTION_VALUE
    }
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Allowed values in display order (e.g., `["Small", "Large"]`).
    pub values: Vec<String>,
}

impl ProductOption {
    pub fn new<V: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A purchasable combination of option values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub available_for_sale: bool,
    pub sku: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    /// One entry per product option.
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
}

impl ProductVariant {
    /// Whether this is the single placeholder variant of an option-less product.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.selected_options.iter().any(SelectedOption::is_default)
    }

    /// Whether the compare-at price marks this variant as on sale.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_at_price
            .as_ref()
            .is_some_and(|compare| compare.amount > self.price.amount)
    }
}

/// A product with its full option schema and every variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub description: String,
    pub description_html: String,
    pub seo: Seo,
    pub options: Vec<ProductOption>,
    pub images: Vec<Image>,
    /// Variants in declaration order.
    pub variants: Vec<ProductVariant>,
}

/// The slice of a product shown in grids and recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    /// Up to two images: the primary shot and the hover shot.
    pub images: Vec<Image>,
    pub price_range: PriceRange,
    /// Selected options of the first variant, used to build its link.
    pub first_variant_options: Vec<SelectedOption>,
}

/// Intent for product recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductRecommendationIntent {
    #[default]
    Related,
    Complementary,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection with one page of its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub products: Vec<ProductSummary>,
    pub page_info: PageInfo,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product fields embedded in a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMerchandiseProduct {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
}

/// The variant a cart line holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMerchandise {
    pub id: VariantId,
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub image: Option<Image>,
    pub product: CartMerchandiseProduct,
}

/// Cost breakdown of a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineCost {
    pub amount_per_quantity: Money,
    pub total_amount: Money,
    pub compare_at_amount_per_quantity: Option<Money>,
}

/// One variant/quantity entry in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: u32,
    pub cost: CartLineCost,
    pub merchandise: CartMerchandise,
}

/// Cart totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCost {
    pub subtotal: Money,
    pub total: Money,
}

/// A snapshot of a Shopify cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// Opaque checkout URL owned by Shopify.
    pub checkout_url: String,
    pub total_quantity: u32,
    pub cost: CartCost,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineInput {
    pub merchandise_id: VariantId,
    pub quantity: u32,
}

/// Input for changing the quantity of an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdateInput {
    pub id: CartLineId,
    pub quantity: u32,
}

/// User error returned by a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserError {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}

// =============================================================================
// Customer Types
// =============================================================================

/// A customer record created for a newsletter signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub accepts_marketing: bool,
}

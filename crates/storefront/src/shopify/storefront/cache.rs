//! Cache types for Storefront API responses.

use noh_core::ProductId;

use crate::shopify::types::{Collection, PageRequest, Product, ProductRecommendationIntent, ProductSummary};

/// Cache key for catalog reads. Carts are never cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Collection { handle: String, page: PageRequest },
    Recommendations {
        product_id: ProductId,
        intent: ProductRecommendationIntent,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Collection(Box<Collection>),
    Recommendations(Vec<ProductSummary>),
}

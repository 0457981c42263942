//! Collection and product summary conversion functions.

use noh_core::{CollectionId, ProductId};

use crate::shopify::types::{Collection, PriceRange, ProductSummary};

use super::super::queries::{get_collection, raw};
use super::{convert_image, convert_money, convert_page_info, convert_selected_options};

pub fn convert_product_summary(product: raw::ProductSummary) -> ProductSummary {
    ProductSummary {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        images: product.images.nodes.into_iter().map(convert_image).collect(),
        price_range: PriceRange {
            min_variant_price: convert_money(product.price_range.min_variant_price),
            max_variant_price: convert_money(product.price_range.max_variant_price),
        },
        first_variant_options: product
            .variants
            .nodes
            .into_iter()
            .next()
            .map(|v| convert_selected_options(v.selected_options))
            .unwrap_or_default(),
    }
}

pub fn convert_collection(collection: get_collection::Collection) -> Collection {
    Collection {
        id: CollectionId::new(collection.id),
        handle: collection.handle,
        title: collection.title,
        description: collection.description,
        products: collection
            .products
            .nodes
            .into_iter()
            .map(convert_product_summary)
            .collect(),
        page_info: convert_page_info(collection.products.page_info),
    }
}

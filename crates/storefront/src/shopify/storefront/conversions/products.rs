//! Product type conversion functions.

use noh_core::{ProductId, VariantId};

use crate::shopify::types::{Product, ProductOption, ProductVariant, Seo};

use super::super::queries::{get_product, raw};
use super::{convert_image, convert_money, convert_selected_options};

pub fn convert_variant(variant: raw::Variant) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        sku: variant.sku.filter(|s| !s.is_empty()),
        price: convert_money(variant.price),
        compare_at_price: variant.compare_at_price.map(convert_money),
        selected_options: convert_selected_options(variant.selected_options),
        image: variant.image.map(convert_image),
    }
}

fn convert_option(option: raw::ProductOption) -> ProductOption {
    ProductOption::new(
        option.name,
        option.option_values.into_iter().map(|v| v.name),
    )
}

/// Convert a product and the variants on its first page.
///
/// Later variant pages are appended by the client.
pub fn convert_product(product: get_product::Product) -> Product {
    Product {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        vendor: product.vendor,
        description: product.description,
        description_html: product.description_html,
        seo: product
            .seo
            .map(|s| Seo {
                title: s.title,
                description: s.description,
            })
            .unwrap_or_default(),
        options: product.options.into_iter().map(convert_option).collect(),
        images: product.images.nodes.into_iter().map(convert_image).collect(),
        variants: product
            .variants
            .nodes
            .into_iter()
            .map(convert_variant)
            .collect(),
    }
}

//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_cart, convert_customer, join_user_errors};
pub use collections::{convert_collection, convert_product_summary};
pub use products::{convert_product, convert_variant};

use noh_core::{CurrencyCode, Money};

use crate::shopify::types::{Image, PageInfo, SelectedOption};

use super::queries::raw;

pub(super) fn convert_money(money: raw::MoneyV2) -> Money {
    Money::new(money.amount, CurrencyCode::new(money.currency_code))
}

pub(super) fn convert_image(image: raw::Image) -> Image {
    Image {
        id: image.id,
        url: image.url,
        alt_text: image.alt_text,
        width: image.width,
        height: image.height,
    }
}

pub(super) fn convert_selected_options(options: Vec<raw::SelectedOption>) -> Vec<SelectedOption> {
    options
        .into_iter()
        .map(|o| SelectedOption::new(o.name, o.value))
        .collect()
}

pub(super) fn convert_page_info(info: raw::PageInfo) -> PageInfo {
    PageInfo {
        has_next_page: info.has_next_page,
        has_previous_page: info.has_previous_page,
        start_cursor: info.start_cursor,
        end_cursor: info.end_cursor,
    }
}

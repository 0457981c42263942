//! The seam between the coordinator and the cart service.

use std::future::Future;

use noh_core::{CartId, CartLineId};

use crate::shopify::{Cart, CartLineInput, CartLineUpdateInput, ShopifyError, StorefrontClient};

/// Cart service operations. Every call returns the refreshed cart.
pub trait CartBackend: Send + Sync + 'static {
    fn create_cart(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn get_cart(&self, cart_id: &CartId) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;
}

impl CartBackend for StorefrontClient {
    fn create_cart(
        &self,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        Self::create_cart(self, lines)
    }

    fn get_cart(&self, cart_id: &CartId) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        Self::get_cart(self, cart_id)
    }

    fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        Self::add_lines(self, cart_id, lines)
    }

    fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        Self::update_lines(self, cart_id, lines)
    }

    fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send {
        Self::remove_lines(self, cart_id, line_ids)
    }
}

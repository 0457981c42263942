//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cart::CartCoordinators;
use crate::config::StorefrontConfig;
use crate::shopify::StorefrontClient;

/// How long an untouched cart coordinator stays in memory.
const CART_IDLE: Duration = Duration::from_secs(30 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the Storefront API client and the live cart coordinators.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    carts: CartCoordinators<StorefrontClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify, config.catalog_cache_ttl);
        let carts = CartCoordinators::new(storefront.clone(), CART_IDLE);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                carts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get the cart coordinators.
    #[must_use]
    pub fn carts(&self) -> &CartCoordinators<StorefrontClient> {
        &self.inner.carts
    }
}

//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Products, collections and recommendations are cached with `moka`;
//! carts always go to Shopify.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, PathFragment, Response};
use moka::future::Cache;
use noh_core::{CartId, CartLineId, Email, ProductId};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, Customer, PageRequest, Product,
    ProductRecommendationIntent, ProductSummary,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, PathSegment, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{
    convert_cart, convert_collection, convert_customer, convert_product, convert_product_summary,
    convert_variant, join_user_errors,
};
use queries::{
    CartLinesAdd, CartLinesRemove, CartLinesUpdate, CreateCart, CustomerCreate, GetCart,
    GetCollection, GetProduct, GetProductRecommendations, GetProductVariants, cart_lines_add,
    cart_lines_remove, cart_lines_update, create_cart, customer_create, get_cart, get_collection,
    get_product, get_product_recommendations, get_product_variants, raw,
};

/// Variants requested per page (the Storefront API maximum).
const VARIANT_PAGE_SIZE: i64 = 250;

/// Upper bound on variants loaded for one product.
const MAX_VARIANTS: usize = 2048;

/// Products per collection page.
const COLLECTION_PAGE_SIZE: i64 = 50;

/// Characters of a response body kept in logs and error messages.
const BODY_EXCERPT: usize = 500;

fn excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and the catalog
/// cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client whose catalog cache entries live
    /// for `cache_ttl`.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_endpoint(),
                access_token: config.storefront_private_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation and return its data.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);
        let operation = request_body.operation_name;

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            warn!(operation, retry_after, "Shopify rate limited the request");
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first so failures can be logged with it
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation,
                status = %status,
                body = %excerpt(&response_text, BODY_EXCERPT),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::message(format!(
                "HTTP {status}: {}",
                excerpt(&response_text, 200)
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation,
                    error = %e,
                    body = %excerpt(&response_text, BODY_EXCERPT),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation, errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation,
                body = %excerpt(&response_text, BODY_EXCERPT),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::message("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product with its complete variant list.
    ///
    /// Variants beyond the first page are fetched with follow-up
    /// `GetProductVariants` requests until the connection is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no product has this handle, or an
    /// error if any request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let data = self
            .execute::<GetProduct>(get_product::Variables {
                handle: handle.to_string(),
                variant_count: VARIANT_PAGE_SIZE,
            })
            .await?;

        let product_data = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        let mut page_info = product_data.variants.page_info.clone();
        let mut product = convert_product(product_data);

        while page_info.has_next_page && product.variants.len() < MAX_VARIANTS {
            let Some(after) = page_info.end_cursor.take() else {
                warn!("Variant page reports more results without a cursor");
                break;
            };

            let data = self
                .execute::<GetProductVariants>(get_product_variants::Variables {
                    handle: handle.to_string(),
                    first: VARIANT_PAGE_SIZE,
                    after: Some(after),
                })
                .await?;

            let Some(next) = data.product else {
                break;
            };
            page_info = next.variants.page_info;
            product
                .variants
                .extend(next.variants.nodes.into_iter().map(convert_variant));
        }

        if product.variants.len() > MAX_VARIANTS {
            product.variants.truncate(MAX_VARIANTS);
        }
        debug!(variants = product.variants.len(), "Loaded product");

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get product recommendations.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_recommendations(
        &self,
        product_id: &ProductId,
        intent: ProductRecommendationIntent,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let cache_key = CacheKey::Recommendations {
            product_id: product_id.clone(),
            intent,
        };

        if let Some(CacheValue::Recommendations(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for recommendations");
            return Ok(products);
        }

        let data = self
            .execute::<GetProductRecommendations>(get_product_recommendations::Variables {
                product_id: product_id.to_string(),
                intent,
            })
            .await?;

        let products: Vec<ProductSummary> = data
            .product_recommendations
            .map(|recs| recs.into_iter().map(convert_product_summary).collect())
            .unwrap_or_default();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Recommendations(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get one page of a collection's products.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no collection has this handle, or
    /// an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection(
        &self,
        handle: &str,
        page: PageRequest,
    ) -> Result<Collection, ShopifyError> {
        let cache_key = CacheKey::Collection {
            handle: handle.to_string(),
            page: page.clone(),
        };

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = match page {
            PageRequest::First => get_collection::Variables {
                handle: handle.to_string(),
                first: Some(COLLECTION_PAGE_SIZE),
                last: None,
                start_cursor: None,
                end_cursor: None,
            },
            PageRequest::After(cursor) => get_collection::Variables {
                handle: handle.to_string(),
                first: Some(COLLECTION_PAGE_SIZE),
                last: None,
                start_cursor: None,
                end_cursor: Some(cursor),
            },
            PageRequest::Before(cursor) => get_collection::Variables {
                handle: handle.to_string(),
                first: None,
                last: Some(COLLECTION_PAGE_SIZE),
                start_cursor: Some(cursor),
                end_cursor: None,
            },
        };

        let data = self.execute::<GetCollection>(variables).await?;

        let collection = data
            .collection
            .map(convert_collection)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart, optionally with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CreateCart>(create_cart::Variables {
                input: create_cart::CartInput {
                    lines: lines.into_iter().map(line_input).collect(),
                },
            })
            .await?;

        cart_from_payload(data.cart_create, "Failed to create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart has expired or never
    /// existed, or an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<GetCart>(get_cart::Variables {
                cart_id: cart_id.to_string(),
            })
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesAdd>(cart_lines_add::Variables {
                cart_id: cart_id.to_string(),
                lines: lines.into_iter().map(line_input).collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_add, "Failed to add to cart")
    }

    /// Set the quantity of existing lines. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesUpdate>(cart_lines_update::Variables {
                cart_id: cart_id.to_string(),
                lines: lines
                    .into_iter()
                    .map(|line| cart_lines_update::CartLineUpdateInput {
                        id: line.id.into_inner(),
                        quantity: i64::from(line.quantity),
                    })
                    .collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CartLinesRemove>(cart_lines_remove::Variables {
                cart_id: cart_id.to_string(),
                line_ids: line_ids.into_iter().map(CartLineId::into_inner).collect(),
            })
            .await?;

        cart_from_payload(data.cart_lines_remove, "Failed to remove from cart")
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Create a customer who accepts marketing email.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` when Shopify rejects the input
    /// (including an email that is already registered), or an error if the
    /// API request fails.
    #[instrument(skip(self, email, password))]
    pub async fn create_customer(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Customer, ShopifyError> {
        let data = self
            .execute::<CustomerCreate>(customer_create::Variables {
                input: customer_create::CustomerCreateInput {
                    email: email.as_str().to_string(),
                    password: password.expose_secret().to_string(),
                    accepts_marketing: true,
                },
            })
            .await?;

        let Some(payload) = data.customer_create else {
            return Err(ShopifyError::message("Failed to create customer"));
        };
        if let Some(message) = join_user_errors(payload.customer_user_errors) {
            return Err(ShopifyError::UserError(message));
        }
        payload
            .customer
            .map(convert_customer)
            .ok_or_else(|| ShopifyError::message("Failed to create customer"))
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, handle: &str) {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(handle.to_string()))
            .await;
    }
}

fn line_input(line: CartLineInput) -> raw::CartLineInput {
    raw::CartLineInput {
        merchandise_id: line.merchandise_id.into_inner(),
        quantity: i64::from(line.quantity),
    }
}

/// Unwrap a cart mutation payload, turning user errors into `UserError`.
fn cart_from_payload(
    payload: Option<raw::CartPayload>,
    failure: &'static str,
) -> Result<Cart, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::message(failure));
    };
    if let Some(message) = join_user_errors(payload.user_errors) {
        return Err(ShopifyError::UserError(message));
    }
    payload
        .cart
        .map(convert_cart)
        .ok_or_else(|| ShopifyError::message(failure))
}

fn convert_graphql_error(error: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: error.message,
        locations: error
            .locations
            .unwrap_or_default()
            .into_iter()
            .map(|l| GraphQLErrorLocation {
                line: i64::from(l.line),
                column: i64::from(l.column),
            })
            .collect(),
        path: error
            .path
            .unwrap_or_default()
            .into_iter()
            .map(|fragment| match fragment {
                PathFragment::Key(key) => PathSegment::Key(key),
                PathFragment::Index(index) => PathSegment::Index(i64::from(index)),
            })
            .collect(),
    }
}

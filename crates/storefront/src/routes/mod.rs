//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Catalog
//! GET  /products/:handle                - Product detail (302 to canonical selection)
//! GET  /products/:handle/recommendations - Recommendations fragment (HTMX)
//! GET  /collections/:handle             - Collection grid (?cursor=&direction=)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                            - Cart page
//! POST /cart/add                        - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update                     - Step or set quantity (returns cart_items fragment)
//! POST /cart/remove                     - Remove line (returns cart_items fragment)
//! GET  /cart/count                      - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                        - Redirect to Shopify checkout
//!
//! # Newsletter (HTMX fragments)
//! GET  /newsletter                      - Signup dialog
//! POST /newsletter                      - Subscribe
//! POST /newsletter/dismiss              - Close dialog and stop auto-open
//! ```
//!
//! Every `POST` route is rate limited per client IP when enabled.

pub mod cart;
pub mod collections;
pub mod layout;
pub mod newsletter;
pub mod products;

use axum::{
    Router,
    extract::Request,
    http::{StatusCode, header},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{create_session_layer, mutation_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Temporary (302) redirect.
///
/// axum's `Redirect::to` answers 303, which browsers and crawlers treat
/// differently for canonicalization.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
async fn health() -> &'static str {
    "ok"
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{handle}", get(products::show))
        .route("/{handle}/recommendations", get(products::recommendations))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new().route("/{handle}", get(collections::show))
}

/// Create the read-only routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        .route("/cart", get(cart::show))
        .route("/cart/count", get(cart::count))
        .route("/checkout", get(cart::checkout))
        .route("/newsletter", get(newsletter::dialog))
}

/// Create the mutation routes.
pub fn mutation_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/newsletter", post(newsletter::subscribe))
        .route("/newsletter/dismiss", post(newsletter::dismiss))
}

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let mut mutations = mutation_routes();
    if state.config().rate_limit {
        match mutation_rate_limiter() {
            Some(limiter) => mutations = mutations.layer(limiter),
            None => tracing::warn!("Rate limiter configuration rejected, mutations are unlimited"),
        }
    }

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    routes()
        .merge(mutations)
        .layer(create_session_layer(state.config()))
        .layer(from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}

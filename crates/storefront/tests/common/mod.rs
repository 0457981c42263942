//! Shared fixtures for storefront integration tests.
//!
//! Shopify responses are built as JSON in the shape the Storefront API
//! returns, so the tests exercise the real parsing and conversion code.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use noh_storefront::config::StorefrontConfig;
use noh_storefront::shopify::StorefrontClient;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Private token accepted by the config's entropy check.
pub const PRIVATE_TOKEN: &str = "shpat_9f8A3kQ2mZ7xR1vL5tB0";

/// Storefront configuration pointed at a mock Shopify endpoint.
pub fn config(endpoint: &str) -> StorefrontConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("NOH_BASE_URL", "http://localhost:3000".to_string()),
        ("NOH_RATE_LIMIT", "false".to_string()),
        ("SHOPIFY_STORE", "noh-test.myshopify.com".to_string()),
        ("SHOPIFY_STOREFRONT_PUBLIC_TOKEN", "public-token".to_string()),
        ("SHOPIFY_STOREFRONT_PRIVATE_TOKEN", PRIVATE_TOKEN.to_string()),
        ("SHOPIFY_STOREFRONT_ENDPOINT", format!("{endpoint}/graphql.json")),
    ]);
    StorefrontConfig::from_lookup(&|key| vars.get(key).cloned())
        .unwrap_or_else(|e| panic!("test config rejected: {e}"))
}

/// Client for a mock server.
pub fn client(server: &MockServer) -> StorefrontClient {
    StorefrontClient::new(&config(&server.uri()).shopify, Duration::from_secs(60))
}

/// Mount a 200 response for one named operation.
pub async fn mount_operation(server: &MockServer, operation: &str, data: Value) {
    Mock::given(method("POST"))
        .and(header("Shopify-Storefront-Private-Token", PRIVATE_TOKEN))
        .and(body_partial_json(json!({ "operationName": operation })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

pub fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "USD" })
}

pub fn variant(id: u32, color: &str, size: &str, available: bool) -> Value {
    json!({
        "id": format!("gid://shopify/ProductVariant/{id}"),
        "title": format!("{color} / {size}"),
        "availableForSale": available,
        "sku": format!("FRA-{id}"),
        "price": money("185.0"),
        "compareAtPrice": null,
        "selectedOptions": [
            { "name": "Color", "value": color },
            { "name": "Size", "value": size }
        ],
        "image": null
    })
}

pub fn page_info(has_next: bool, end_cursor: Option<&str>) -> Value {
    json!({
        "hasNextPage": has_next,
        "hasPreviousPage": false,
        "startCursor": null,
        "endCursor": end_cursor
    })
}

/// Frame A: Color × Size where Tortoise/Large does not exist and
/// Tortoise/Small is sold out.
pub fn frame_a_variants() -> Vec<Value> {
    vec![
        variant(1, "Black", "Small", true),
        variant(2, "Black", "Large", true),
        variant(3, "Tortoise", "Small", false),
    ]
}

/// `GetProduct` data for Frame A with the given first variant page.
pub fn frame_a(variants: Vec<Value>, page: Value) -> Value {
    json!({
        "product": {
            "id": "gid://shopify/Product/1",
            "handle": "frame-a",
            "title": "Frame A",
            "vendor": "NOH",
            "description": "Acetate frame.",
            "descriptionHtml": "<p>Acetate frame.</p>",
            "seo": { "title": null, "description": null },
            "options": [
                { "name": "Color", "optionValues": [{ "name": "Black" }, { "name": "Tortoise" }] },
                { "name": "Size", "optionValues": [{ "name": "Small" }, { "name": "Large" }] }
            ],
            "images": { "nodes": [] },
            "variants": { "nodes": variants, "pageInfo": page }
        }
    })
}

pub fn cart_line(id: u32, variant_id: u32, quantity: u32) -> Value {
    json!({
        "id": format!("gid://shopify/CartLine/{id}"),
        "quantity": quantity,
        "cost": {
            "amountPerQuantity": money("185.0"),
            "totalAmount": money(&format!("{}.0", 185 * quantity)),
            "compareAtAmountPerQuantity": null
        },
        "merchandise": {
            "id": format!("gid://shopify/ProductVariant/{variant_id}"),
            "title": "Black / Small",
            "selectedOptions": [
                { "name": "Color", "value": "Black" },
                { "name": "Size", "value": "Small" }
            ],
            "image": null,
            "product": { "id": "gid://shopify/Product/1", "handle": "frame-a", "title": "Frame A" }
        }
    })
}

pub fn cart(lines: Vec<Value>) -> Value {
    let total: u64 = lines
        .iter()
        .filter_map(|l| l["quantity"].as_u64())
        .sum();
    json!({
        "id": "gid://shopify/Cart/abc123",
        "checkoutUrl": "https://noh-test.myshopify.com/cart/c/abc123?key=xyz",
        "totalQuantity": total,
        "cost": {
            "subtotalAmount": money(&format!("{}.0", 185 * total)),
            "totalAmount": money(&format!("{}.0", 185 * total))
        },
        "lines": { "nodes": lines }
    })
}

/// Payload of a cart mutation.
pub fn cart_payload(cart: Value) -> Value {
    json!({ "cart": cart, "userErrors": [] })
}

//! Router tests: the full middleware stack served with `oneshot` against a
//! mock Shopify endpoint.

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use noh_storefront::routes;
use noh_storefront::state::AppState;
use serde_json::json;
use tower::ServiceExt;
use wiremock::MockServer;

use common::{cart, cart_line, cart_payload, config, frame_a, frame_a_variants, mount_operation, page_info};

async fn app(server: &MockServer) -> Router {
    mount_operation(server, "GetProduct", frame_a(frame_a_variants(), page_info(false, None))).await;
    routes::app(AppState::new(config(&server.uri())))
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty())).await
}

async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send(app, request.body(Body::from(body.to_string()))).await
}

async fn send(app: &Router, request: Result<Request<Body>, axum::http::Error>) -> Response<Body> {
    let request = request.unwrap_or_else(|e| panic!("bad request: {e}"));
    app.clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|e| match e {})
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("unreadable body: {e}"));
    String::from_utf8_lossy(&bytes).into_owned()
}

fn header_str<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// `name=value` of the session cookie set on a response.
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("noh_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Health and middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok_with_request_id() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_str(&response, "x-request-id").is_some_and(|id| !id.is_empty()));
    assert_eq!(body_text(response).await, "ok");
}

// ---------------------------------------------------------------------------
// Product pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_variant_redirects_to_first_variant() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/products/frame-a?Color=Tortoise&Size=Large").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        header_str(&response, "location"),
        Some("/products/frame-a?Color=Black&Size=Small")
    );
}

#[tokio::test]
async fn redirect_drops_tracking_and_keeps_other_params() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(
        &app,
        "/products/frame-a?Size=Large&Color=Tortoise&utm_source=ig&ref=abc",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        header_str(&response, "location"),
        Some("/products/frame-a?Color=Black&Size=Small&ref=abc")
    );
}

#[tokio::test]
async fn bare_product_url_redirects_to_first_variant() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/products/frame-a").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        header_str(&response, "location"),
        Some("/products/frame-a?Color=Black&Size=Small")
    );
}

#[tokio::test]
async fn existing_variant_renders_with_canonical_link() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/products/frame-a?Size=Large&Color=Black").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"rel="canonical""#));
    assert!(body.contains("/products/frame-a?Color=Black&amp;Size=Large"));
    assert!(body.contains("Add to bag"));
    assert!(body.contains("/products/frame-a/recommendations"));
}

#[tokio::test]
async fn sold_out_variant_disables_add_to_cart() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/products/frame-a?Color=Tortoise&Size=Small").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("SOLD OUT"));
    assert!(!body.contains("Add to bag"));
}

#[tokio::test]
async fn missing_product_is_404() {
    let server = MockServer::start().await;
    mount_operation(&server, "GetProduct", json!({ "product": null })).await;
    let app = routes::app(AppState::new(config(&server.uri())));

    let response = get(&app, "/products/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_recommendations_render_empty_fragment() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    // No GetProductRecommendations mock: wiremock answers 404.
    let response = get(&app, "/products/frame-a/recommendations").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.trim().is_empty());
}

// ---------------------------------------------------------------------------
// Newsletter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn newsletter_opens_until_closed() {
    let server = MockServer::start().await;
    let app = app(&server).await;
    let uri = "/products/frame-a?Color=Black&Size=Small";

    let body = body_text(get(&app, uri).await).await;
    assert!(body.contains("load delay:3s"));

    let request = Request::get(uri)
        .header(header::COOKIE, "noh_newsletter=closed")
        .body(Body::empty());
    let body = body_text(send(&app, request).await).await;
    assert!(!body.contains("load delay:3s"));
    assert!(body.contains("newsletter-open from:body"));
}

#[tokio::test]
async fn newsletter_dismiss_sets_cookie() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = post_form(&app, "/newsletter/dismiss", "", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        header_str(&response, "set-cookie").is_some_and(|c| c.starts_with("noh_newsletter=closed"))
    );
}

#[tokio::test]
async fn newsletter_validation_renders_inline() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = post_form(&app, "/newsletter", "email=not-an-email&consent=on", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "hx-trigger"), Some("newsletter-open"));
    let body = body_text(response).await;
    assert!(body.contains("field-error"));
    assert!(body.contains("not-an-email"));
}

#[tokio::test]
async fn newsletter_existing_subscriber_succeeds() {
    let server = MockServer::start().await;
    mount_operation(
        &server,
        "CustomerCreate",
        json!({
            "customerCreate": {
                "customer": null,
                "customerUserErrors": [{ "code": "TAKEN", "field": ["input", "email"], "message": "Email has already been taken" }]
            }
        }),
    )
    .await;
    let app = app(&server).await;

    let response = post_form(&app, "/newsletter", "email=shopper%40example.com&consent=on", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        header_str(&response, "set-cookie").is_some_and(|c| c.starts_with("noh_newsletter=closed"))
    );
    assert!(body_text(response).await.contains("on the list"));
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_without_cart_is_unauthorized() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = post_form(&app, "/cart/update", "line_id=gid%3A%2F%2Fshopify%2FCartLine%2F1&step=increment", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_without_cart_returns_to_cart_page() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let response = get(&app, "/checkout").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header_str(&response, "location"), Some("/cart"));
}

#[tokio::test]
async fn add_creates_cart_and_remembers_it() {
    let server = MockServer::start().await;
    mount_operation(&server, "CreateCart", json!({ "cartCreate": cart_payload(cart(vec![cart_line(1, 1, 1)])) })).await;
    mount_operation(&server, "GetCart", json!({ "cart": cart(vec![cart_line(1, 1, 1)]) })).await;
    let app = app(&server).await;

    let response = post_form(
        &app,
        "/cart/add",
        "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F1&quantity=1",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "hx-trigger"), Some("cart-updated"));
    let cookie = session_cookie(&response).unwrap_or_else(|| panic!("no session cookie set"));
    assert!(body_text(response).await.contains(">1<"));

    let request = Request::get("/cart").header(header::COOKIE, &cookie).body(Body::empty());
    let body = body_text(send(&app, request).await).await;
    assert!(body.contains("Frame A"));
    assert!(body.contains("$185.00"));
    assert!(body.contains("Checkout"));

    let request = Request::get("/checkout").header(header::COOKIE, &cookie).body(Body::empty());
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        header_str(&response, "location"),
        Some("https://noh-test.myshopify.com/cart/c/abc123?key=xyz")
    );
}

#[tokio::test]
async fn decrement_at_one_is_rejected() {
    let server = MockServer::start().await;
    mount_operation(&server, "CreateCart", json!({ "cartCreate": cart_payload(cart(vec![cart_line(1, 1, 1)])) })).await;
    let app = app(&server).await;

    let response = post_form(
        &app,
        "/cart/add",
        "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F1",
        None,
    )
    .await;
    let cookie = session_cookie(&response).unwrap_or_else(|| panic!("no session cookie set"));

    let response = post_form(
        &app,
        "/cart/update",
        "line_id=gid%3A%2F%2Fshopify%2FCartLine%2F1&step=decrement",
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn failed_update_renders_last_confirmed_cart() {
    let server = MockServer::start().await;
    mount_operation(&server, "CreateCart", json!({ "cartCreate": cart_payload(cart(vec![cart_line(1, 1, 2)])) })).await;
    mount_operation(
        &server,
        "CartLinesUpdate",
        json!({ "cartLinesUpdate": { "cart": null, "userErrors": [{ "code": "INVALID", "field": null, "message": "Line is out of stock" }] } }),
    )
    .await;
    let app = app(&server).await;

    let response = post_form(
        &app,
        "/cart/add",
        "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F1&quantity=2",
        None,
    )
    .await;
    let cookie = session_cookie(&response).unwrap_or_else(|| panic!("no session cookie set"));

    let response = post_form(
        &app,
        "/cart/update",
        "line_id=gid%3A%2F%2Fshopify%2FCartLine%2F1&step=increment",
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "hx-trigger"), Some("cart-error"));
    let body = body_text(response).await;
    assert!(body.contains("cart-error"));
    assert!(body.contains("<span>2</span>"));
}

#[tokio::test]
async fn cart_page_rereads_cart() {
    let server = MockServer::start().await;
    mount_operation(&server, "CreateCart", json!({ "cartCreate": cart_payload(cart(vec![cart_line(1, 1, 1)])) })).await;
    // Another device raised the quantity since this cart was created.
    mount_operation(&server, "GetCart", json!({ "cart": cart(vec![cart_line(1, 1, 3)]) })).await;
    let app = app(&server).await;

    let response = post_form(
        &app,
        "/cart/add",
        "variant_id=gid%3A%2F%2Fshopify%2FProductVariant%2F1",
        None,
    )
    .await;
    let cookie = session_cookie(&response).unwrap_or_else(|| panic!("no session cookie set"));

    let request = Request::get("/cart").header(header::COOKIE, &cookie).body(Body::empty());
    let body = body_text(send(&app, request).await).await;
    assert!(body.contains("<span>3</span>"));
    assert!(body.contains("$555.00"));
}

#[tokio::test]
async fn cart_badge_keeps_its_target() {
    let server = MockServer::start().await;
    let app = app(&server).await;

    let body = body_text(get(&app, "/products/frame-a?Color=Black&Size=Small").await).await;
    assert!(body.contains(
        r#"<span id="cart-count" hx-get="/cart/count" hx-trigger="load, cart-updated from:body" hx-swap="innerHTML">"#
    ));
    assert!(body.contains(r##"hx-target="#cart-count" hx-swap="innerHTML""##));

    // The fragment is swapped inside the wrapper, so it must not carry the id.
    let badge = body_text(get(&app, "/cart/count").await).await;
    assert!(badge.trim_start().starts_with(r#"<span class="badge""#));
    assert!(!badge.contains("cart-count"));
}

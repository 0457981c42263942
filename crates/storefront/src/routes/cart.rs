//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart ID is stored in the session; every mutation goes through the
//! cart's coordinator so concurrent button presses build on each other.
//! A failed mutation re-renders the last confirmed cart instead of an error
//! page.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use noh_core::{CartId, CartLineId, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartCoordinator, CartDisplay, CartError, MAX_QUANTITY, Step};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::CART_ID_KEY;
use crate::routes::found;
use crate::routes::layout::PageContext;
use crate::shopify::{CartLineInput, CartLineUpdateInput, StorefrontClient};
use crate::state::AppState;

/// Event fired after any successful cart mutation.
const CART_UPDATED: [(&str, &str); 1] = [("HX-Trigger", "cart-updated")];

/// Event fired when a cart mutation fails.
const CART_ERROR: [(&str, &str); 1] = [("HX-Trigger", "cart-error")];

/// Message shown when Shopify rejects a mutation.
const MUTATION_FAILED: &str = "We couldn't update your bag. Please try again.";

type Coordinator = Arc<CartCoordinator<StorefrontClient>>;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<String>(CART_ID_KEY)
        .await
        .ok()
        .flatten()
        .map(CartId::new)
}

/// Set the cart ID in the session.
async fn set_cart_id(
    session: &Session,
    cart_id: &CartId,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(CART_ID_KEY, cart_id.as_str()).await
}

/// The coordinator for the session's cart, if the session has one.
async fn session_coordinator(state: &AppState, session: &Session) -> Option<Coordinator> {
    let cart_id = get_cart_id(session).await?;
    Some(state.carts().get_or_create(&cart_id).await)
}

/// The cart as the service has it now. Falls back to the last snapshot if
/// the read fails.
async fn fresh_view(coordinator: &Coordinator) -> Option<CartDisplay> {
    if let Err(e) = coordinator.refresh().await {
        tracing::warn!(cart_id = %coordinator.cart_id(), error = %e, "Failed to re-read cart");
    }
    coordinator.view().await
}

/// The cart as currently displayed, loading it if needed.
async fn current_view(coordinator: &Coordinator) -> Option<CartDisplay> {
    if let Err(e) = coordinator.snapshot().await {
        tracing::warn!(cart_id = %coordinator.cart_id(), error = %e, "Failed to load cart");
        return None;
    }
    coordinator.view().await
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
///
/// The quantity buttons submit `step`; a quantity input submits `quantity`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub step: Option<Step>,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: Option<CartDisplay>,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: Option<CartDisplay>,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

impl CartCountTemplate {
    fn from_view(view: Option<&CartDisplay>) -> Self {
        Self {
            count: view.map_or(0, |cart| cart.total_quantity),
        }
    }
}

/// Render the result of a line mutation as the cart items fragment.
///
/// Upstream failures show the last confirmed cart with an error message;
/// rejected button presses become `AppError`s.
async fn items_response(
    coordinator: &Coordinator,
    result: std::result::Result<crate::shopify::Cart, CartError>,
) -> Result<Response> {
    match result {
        Ok(_) => Ok((
            AppendHeaders(CART_UPDATED),
            CartItemsTemplate {
                cart: coordinator.view().await,
                error: None,
            },
        )
            .into_response()),
        Err(CartError::Upstream(e)) => {
            tracing::warn!(cart_id = %coordinator.cart_id(), error = %e, "Rendering last confirmed cart");
            Ok((
                AppendHeaders(CART_ERROR),
                CartItemsTemplate {
                    cart: coordinator.view().await,
                    error: Some(MUTATION_FAILED.to_string()),
                },
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page. Always re-reads the cart.
#[instrument(skip(state, session, page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> impl IntoResponse {
    let cart = match session_coordinator(&state, &session).await {
        Some(coordinator) => fresh_view(&coordinator).await,
        None => None,
    };

    CartShowTemplate {
        page,
        cart,
        error: None,
    }
}

/// Add item to cart (HTMX).
///
/// Creates a new cart if the session has none. Returns the count badge with
/// an HTMX trigger so other cart elements refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(AppError::Validation {
            field: "quantity",
            message: format!("Quantity must be between 1 and {MAX_QUANTITY}"),
        });
    }
    if form.variant_id.trim().is_empty() {
        return Err(AppError::Validation {
            field: "variant_id",
            message: "Select a variant first".to_string(),
        });
    }

    add_breadcrumb("cart", "Add line", Some(&[("variant_id", form.variant_id.as_str())]));
    let lines = vec![CartLineInput {
        merchandise_id: VariantId::new(form.variant_id),
        quantity,
    }];

    let (coordinator, result) = match session_coordinator(&state, &session).await {
        Some(coordinator) => {
            let result = coordinator.add_lines(lines).await;
            (Some(coordinator), result.map(|_| ()))
        }
        None => match state.carts().create_cart(lines).await {
            Ok(coordinator) => {
                if let Err(e) = set_cart_id(&session, coordinator.cart_id()).await {
                    tracing::error!(error = %e, "Failed to save cart ID to session");
                }
                (Some(coordinator), Ok(()))
            }
            Err(e) => (None, Err(e)),
        },
    };

    let view = match &coordinator {
        Some(coordinator) => coordinator.view().await,
        None => None,
    };
    let badge = CartCountTemplate::from_view(view.as_ref());

    match result {
        Ok(()) => Ok((AppendHeaders(CART_UPDATED), badge).into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item to cart");
            Ok((AppendHeaders(CART_ERROR), badge).into_response())
        }
    }
}

/// Update cart line quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let Some(coordinator) = session_coordinator(&state, &session).await else {
        return Err(AppError::Unauthorized("no cart in session".to_string()));
    };
    let line_id = CartLineId::new(form.line_id);

    let result = match (form.step, form.quantity) {
        (Some(step), _) => coordinator.step_line(&line_id, step).await,
        (None, Some(quantity)) if quantity <= MAX_QUANTITY => {
            coordinator
                .update_lines(vec![CartLineUpdateInput {
                    id: line_id,
                    quantity,
                }])
                .await
        }
        (None, Some(_)) => {
            return Err(AppError::Validation {
                field: "quantity",
                message: format!("Quantity must be at most {MAX_QUANTITY}"),
            });
        }
        (None, None) => {
            return Err(AppError::Validation {
                field: "quantity",
                message: "Missing quantity".to_string(),
            });
        }
    };

    items_response(&coordinator, result).await
}

/// Remove line from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let Some(coordinator) = session_coordinator(&state, &session).await else {
        return Err(AppError::Unauthorized("no cart in session".to_string()));
    };

    let result = coordinator
        .remove_lines(vec![CartLineId::new(form.line_id)])
        .await;
    items_response(&coordinator, result).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let view = match session_coordinator(&state, &session).await {
        Some(coordinator) => current_view(&coordinator).await,
        None => None,
    };

    CartCountTemplate::from_view(view.as_ref())
}

/// Redirect to Shopify checkout.
///
/// The checkout URL is passed through exactly as Shopify returned it.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Response {
    let Some(coordinator) = session_coordinator(&state, &session).await else {
        return found("/cart");
    };

    match coordinator.refresh().await {
        Ok(cart) if !cart.lines.is_empty() => found(&cart.checkout_url),
        Ok(_) => found("/cart"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get cart for checkout");
            found("/cart")
        }
    }
}

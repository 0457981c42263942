//! Newsletter subscription route handlers.
//!
//! Subscribing creates a Shopify customer with marketing consent. Existing
//! subscribers are treated as successful signups. Closing or completing the
//! dialog sets a cookie so it stops opening on its own.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use noh_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::routes::layout::NewsletterDialog;
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
    /// Present (as `on`) only when the consent checkbox is ticked.
    pub consent: Option<String>,
}

/// Inline error next to one form field.
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Signup dialog fragment.
#[derive(Template, WebTemplate)]
#[template(path = "newsletter/dialog.html")]
pub struct DialogTemplate {
    pub email: String,
    pub error: Option<FieldError>,
}

impl DialogTemplate {
    /// Error message for `field`, if it is the one that failed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Success fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "newsletter/subscribe_success.html")]
pub struct SubscribeSuccessTemplate {
    pub email: String,
}

/// Error fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "newsletter/subscribe_error.html")]
pub struct SubscribeErrorTemplate {
    pub message: String,
    pub email: String,
}

/// Check the form before anything is sent to Shopify.
fn validate(form: &SubscribeForm) -> Result<Email> {
    let email = Email::parse(&form.email).map_err(|e| AppError::Validation {
        field: "email",
        message: capitalize(&e.to_string()),
    })?;

    if !form.consent.as_deref().is_some_and(|v| !v.is_empty()) {
        return Err(AppError::Validation {
            field: "consent",
            message: "Please agree to receive emails from us.".to_string(),
        });
    }

    Ok(email)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Whether Shopify rejected the signup because the customer already exists.
fn is_existing_customer(error: &ShopifyError) -> bool {
    let ShopifyError::UserError(message) = error else {
        return false;
    };
    let message = message.to_lowercase();
    message.contains("already been taken") || message.contains("already exists")
}

/// Password for a newsletter-only customer.
///
/// Shopify requires one; the shopper never uses it.
fn throwaway_password() -> SecretString {
    SecretString::from(format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()))
}

fn closed_cookie(state: &AppState) -> [(header::HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        NewsletterDialog::closed_cookie(state.config().is_secure()),
    )]
}

/// Render the signup dialog (HTMX).
pub async fn dialog() -> impl IntoResponse {
    DialogTemplate {
        email: String::new(),
        error: None,
    }
}

/// Subscribe to newsletter (HTMX).
///
/// Validation errors re-render the dialog with the message next to the
/// field and keep it open.
#[instrument(skip(state, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    Form(form): Form<SubscribeForm>,
) -> Response {
    let email = match validate(&form) {
        Ok(email) => email,
        Err(AppError::Validation { field, message }) => {
            return (
                NewsletterDialog::open_trigger(),
                DialogTemplate {
                    email: form.email,
                    error: Some(FieldError { field, message }),
                },
            )
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    match state
        .storefront()
        .create_customer(&email, &throwaway_password())
        .await
    {
        Ok(_) => {
            tracing::info!(domain = %email.domain(), "Newsletter subscription successful");
        }
        Err(e) if is_existing_customer(&e) => {
            tracing::info!(domain = %email.domain(), "Email already subscribed, treating as success");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Newsletter subscription failed");
            return SubscribeErrorTemplate {
                message: "Something went wrong. Please try again.".to_string(),
                email: email.into_inner(),
            }
            .into_response();
        }
    }

    (
        closed_cookie(&state),
        SubscribeSuccessTemplate {
            email: email.into_inner(),
        },
    )
        .into_response()
}

/// Close the dialog and stop it opening on later visits.
#[instrument(skip(state))]
pub async fn dismiss(State(state): State<AppState>) -> impl IntoResponse {
    (closed_cookie(&state), "")
}

//! Per-request page context shared by every full-page template.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header, http::request::Parts, response::AppendHeaders};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

/// Cookie remembering that the shopper closed or completed the newsletter
/// dialog.
pub const NEWSLETTER_COOKIE: &str = "noh_newsletter";

const NEWSLETTER_CLOSED: &str = "closed";

/// Client event that opens the newsletter dialog.
pub const NEWSLETTER_OPEN_EVENT: &str = "newsletter-open";

/// State of the newsletter dialog for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsletterDialog {
    /// Open the dialog shortly after the page loads.
    pub auto_open: bool,
}

impl NewsletterDialog {
    /// Derive dialog state from the request's `Cookie` header.
    #[must_use]
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let closed = header.is_some_and(|header| {
            Cookie::split_parse(header)
                .filter_map(Result::ok)
                .any(|c| c.name() == NEWSLETTER_COOKIE && c.value() == NEWSLETTER_CLOSED)
        });
        Self { auto_open: !closed }
    }

    /// Response header asking the page to open the dialog.
    #[must_use]
    pub const fn open_trigger() -> AppendHeaders<[(&'static str, &'static str); 1]> {
        AppendHeaders([("HX-Trigger", NEWSLETTER_OPEN_EVENT)])
    }

    /// `Set-Cookie` value that stops the dialog from opening on its own.
    #[must_use]
    pub fn closed_cookie(secure: bool) -> String {
        Cookie::build((NEWSLETTER_COOKIE, NEWSLETTER_CLOSED))
            .path("/")
            .max_age(Duration::days(365))
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .build()
            .to_string()
    }
}

/// Context every full page renders with.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub newsletter: NewsletterDialog,
}

impl<S: Send + Sync> FromRequestParts<S> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());
        Ok(Self {
            newsletter: NewsletterDialog::from_cookie_header(cookies),
        })
    }
}

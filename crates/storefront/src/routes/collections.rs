//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::filters;
use crate::routes::layout::PageContext;
use crate::shopify::{PageInfo, PageRequest};
use crate::state::AppState;

use super::products::ProductCard;

/// Which way a cursor points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Next,
    Previous,
}

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub cursor: Option<String>,
    pub direction: Option<Direction>,
}

impl PaginationQuery {
    /// The page these parameters ask for. A missing or empty cursor means
    /// the first page.
    #[must_use]
    pub fn page_request(self) -> PageRequest {
        match (self.cursor.filter(|c| !c.is_empty()), self.direction) {
            (None, _) => PageRequest::First,
            (Some(cursor), Some(Direction::Previous)) => PageRequest::Before(cursor),
            (Some(cursor), _) => PageRequest::After(cursor),
        }
    }
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub page: PageContext,
    pub title: String,
    pub description: String,
    pub products: Vec<ProductCard>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

fn page_url(path: &str, cursor: &str, direction: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("cursor", cursor)
        .append_pair("direction", direction)
        .finish();
    format!("{path}?{query}")
}

/// Links to the neighbouring pages, if any.
fn pagination_links(path: &str, info: &PageInfo) -> (Option<String>, Option<String>) {
    let previous = info
        .has_previous_page
        .then_some(info.start_cursor.as_deref())
        .flatten()
        .map(|cursor| page_url(path, cursor, "previous"));
    let next = info
        .has_next_page
        .then_some(info.end_cursor.as_deref())
        .flatten()
        .map(|cursor| page_url(path, cursor, "next"));
    (previous, next)
}

/// Display collection detail page with one page of products.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<PaginationQuery>,
    page: PageContext,
) -> Result<CollectionShowTemplate> {
    let collection = state
        .storefront()
        .get_collection(&handle, query.page_request())
        .await?;

    let (previous_url, next_url) =
        pagination_links(&format!("/collections/{handle}"), &collection.page_info);

    Ok(CollectionShowTemplate {
        page,
        products: collection.products.iter().map(ProductCard::from).collect(),
        title: collection.title,
        description: collection.description,
        previous_url,
        next_url,
    })
}

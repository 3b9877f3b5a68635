//! Deferred below-the-fold fragments, fetched by HTMX after first paint.
//!
//! Each fragment starts its load as a background task and waits at most
//! [`DEFERRED_TIMEOUT`]. Failures and timeouts render the fallback; these
//! endpoints never return an error status.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Datelike;
use tracing::instrument;

use crate::loader::{DEFERRED_TIMEOUT, defer_footer, defer_recommended};
use crate::navigation::FooterView;
use crate::state::AppState;
use crate::views::ProductCardView;

#[derive(Template, WebTemplate)]
#[template(path = "partials/footer.html")]
pub struct FooterTemplate {
    pub footer: FooterView,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/recommended.html")]
pub struct RecommendedTemplate {
    pub products: Vec<ProductCardView>,
}

/// Site footer; the static policy-link footer when the document is
/// unavailable.
#[instrument(skip(state))]
pub async fn footer(State(state): State<AppState>) -> FooterTemplate {
    let year = chrono::Utc::now().year();
    let footer = defer_footer(state.sanity().clone())
        .resolve(DEFERRED_TIMEOUT)
        .await;

    FooterTemplate {
        footer: FooterView::build(footer.as_ref(), year, state.links()),
    }
}

/// Recommended products strip; empty on failure.
#[instrument(skip(state))]
pub async fn recommended(State(state): State<AppState>) -> RecommendedTemplate {
    let products = defer_recommended(state.storefront().clone())
        .resolve(DEFERRED_TIMEOUT)
        .await
        .unwrap_or_default();

    RecommendedTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
    }
}

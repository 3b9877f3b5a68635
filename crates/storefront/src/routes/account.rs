//! Customer account entry points.
//!
//! Accounts live on the commerce platform's hosted pages; the storefront
//! only redirects into that flow.

use axum::{extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::instrument;

use crate::models::session;
use crate::state::AppState;

/// Redirect to the hosted account pages, or home when none are configured.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Redirect {
    state
        .config()
        .shopify
        .account_url()
        .map_or_else(|| Redirect::to("/"), |url| Redirect::to(&url))
}

/// Forget the cart and sign out of the hosted account.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    session::clear_cart(&session).await;
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session on logout");
    }

    state
        .config()
        .shopify
        .account_logout_url()
        .map_or_else(|| Redirect::to("/"), |url| Redirect::to(&url))
}

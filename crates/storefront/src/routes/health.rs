//! Health check endpoints.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use crate::state::AppState;

/// Liveness: the process is serving requests. Checks no dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: both remote APIs answer.
///
/// Returns 503 Service Unavailable if either is unreachable.
#[instrument(skip(state))]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (content, catalog) = tokio::join!(
        state.sanity().get_settings(),
        state.storefront().get_featured_collection()
    );

    match (content, catalog) {
        (Ok(_), Ok(_)) => StatusCode::OK,
        (content, catalog) => {
            if let Err(e) = content {
                tracing::warn!(error = %e, "Content API not ready");
            }
            if let Err(e) = catalog {
                tracing::warn!(error = %e, "Storefront API not ready");
            }
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check
//!
//! # Content
//! GET  /pages/about               - About page
//! GET  /pages/faq                 - FAQ page
//!
//! # Catalog
//! GET  /collections               - Collection listing
//! GET  /collections/all           - All products
//! GET  /collections/{handle}      - Collection detail
//! GET  /products/{handle}         - Product detail (option values select a variant)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! GET  /cart/aside                - Cart overlay
//! GET  /cart/count                - Cart count badge
//! POST /cart/add                  - Add a variant (creates the cart on first add)
//! POST /cart/lines/update         - Set a line quantity
//! POST /cart/lines/remove         - Remove a line
//! POST /cart/discounts            - Apply a discount code
//! POST /cart/discounts/remove     - Remove a discount code
//! POST /cart/gift-cards           - Apply a gift card code
//! POST /cart/gift-cards/remove    - Remove an applied gift card
//! POST /cart/errors/dismiss       - Dismiss an inline cart error
//!
//! # Checkout and accounts
//! GET  /checkout                  - Redirect to the hosted checkout
//! GET  /account                   - Redirect to the hosted account pages
//! GET  /account/logout            - Sign out of the hosted account
//!
//! # Deferred fragments
//! GET  /fragments/footer          - Site footer
//! GET  /fragments/recommended     - Recommended products
//! ```

pub mod account;
pub mod cart;
pub mod collections;
pub mod fragments;
pub mod health;
pub mod home;
pub mod layout;
pub mod pages;
pub mod products;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::from_fn,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::middleware::{
    cart_rate_limiter, create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Fingerprinted assets never change under the same name.
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Create the cart routes router.
///
/// Mutations sit behind the per-IP rate limiter; reads do not.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/lines/update", post(cart::update_line))
        .route("/lines/remove", post(cart::remove_line))
        .route("/discounts", post(cart::add_discount))
        .route("/discounts/remove", post(cart::remove_discount))
        .route("/gift-cards", post(cart::add_gift_card))
        .route("/gift-cards/remove", post(cart::remove_gift_card))
        .route("/errors/dismiss", post(cart::dismiss_error))
        .layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/aside", get(cart::aside))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/all", get(collections::all))
        .route("/{handle}", get(collections::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/logout", get(account::logout))
}

/// Create all page and fragment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/pages/about", get(pages::about))
        .route("/pages/faq", get(pages::faq))
        .nest("/collections", collection_routes())
        .route("/products/{handle}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .nest("/account", account_routes())
        .route("/fragments/footer", get(fragments::footer))
        .route("/fragments/recommended", get(fragments::recommended))
}

/// The complete application: routes, static files and the middleware
/// stack below the Sentry layers (see [`crate::middleware`] for the order).
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    let static_files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ))
        .service(ServeDir::new(STATIC_DIR));

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", static_files)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(trace)
        .with_state(state)
}

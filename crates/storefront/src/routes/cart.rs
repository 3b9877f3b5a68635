//! Cart route handlers.
//!
//! Mutations go through the [`CartCoordinator`](crate::cart::CartCoordinator)
//! and answer with the re-rendered cart contents. A failed mutation is not
//! an HTTP error: the contents come back reverted, with an inline message
//! next to the control that triggered it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use luneva_core::types::{CartId, CartLineId, GiftCardId, MerchandiseId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{
    CartError, CartErrorView, CartIntent, CartView, CoalescingKey, Settlement, SubmitOutcome,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::loader::with_root;
use crate::middleware::CspNonce;
use crate::models::session;
use crate::routes::layout::Shell;
use crate::shopify::{CartLineInput, CartMerchandise, Product};
use crate::state::AppState;

/// Event HTMX listeners use to refresh the cart badge.
const CART_UPDATED: &str = "cart-updated";

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    /// Handle of the product the variant belongs to.
    pub handle: String,
    pub variant_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineForm {
    pub line_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveLineForm {
    pub line_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeForm {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct GiftCardRemoveForm {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DismissErrorForm {
    pub key: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/page.html")]
pub struct CartPageTemplate {
    pub shell: Shell,
    pub cart: CartView,
}

/// Cart overlay fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "cart/aside.html")]
pub struct CartAsideTemplate {
    pub cart: CartView,
}

/// Cart contents fragment, swapped in after every mutation (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "cart/contents.html")]
pub struct CartContentsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Helpers
// =============================================================================

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Contents fragment plus the badge refresh trigger.
fn contents_response(cart: CartView) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED)]),
        CartContentsTemplate { cart },
    )
        .into_response()
}

/// Load the session's cart fresh from the backend.
///
/// A cart that no longer exists is forgotten and reads as empty.
async fn load_view(state: &AppState, session: &Session) -> Result<CartView> {
    let Some(cart_id) = session::cart_id(session).await else {
        return Ok(CartView::default());
    };

    match state.carts().load(&cart_id).await? {
        Some(projected) => Ok(CartView::from_projection(&projected)),
        None => {
            tracing::info!(cart_id = %cart_id, "Cart expired, clearing session");
            session::clear_cart(session).await;
            Ok(CartView::default())
        }
    }
}

/// The session's cart id, or [`CartError::Missing`].
async fn require_cart(session: &Session) -> Result<CartId> {
    Ok(session::cart_id(session)
        .await
        .ok_or(CartError::Missing)?)
}

/// Submit an intent against the session's cart.
///
/// A cart that disappeared is forgotten and reported as missing.
async fn submit(state: &AppState, session: &Session, intent: CartIntent) -> Result<SubmitOutcome> {
    let cart_id = require_cart(session).await?;
    let key = intent.key();

    let outcome = match state.carts().submit(&cart_id, intent).await {
        Ok(outcome) => outcome,
        Err(CartError::Missing) => {
            session::clear_cart(session).await;
            return Err(CartError::Missing.into());
        }
        Err(e) => return Err(e.into()),
    };

    match &outcome.settlement {
        Settlement::Applied => add_breadcrumb("cart", "Cart updated", Some(&[("key", key.as_str())])),
        Settlement::Reverted { message } => {
            tracing::info!(key = %key, message = %message, "Cart mutation reverted");
        }
        Settlement::Superseded => tracing::debug!(key = %key, "Cart mutation superseded"),
    }

    Ok(outcome)
}

/// Add intent for one variant, previewed from its product when known.
///
/// Without a product the line only appears once the backend confirms it.
fn add_intent(
    product: Option<&Product>,
    variant_id: MerchandiseId,
    quantity: u32,
) -> Result<CartIntent> {
    let intent = match product {
        Some(product) => {
            let variant = product.variant(&variant_id).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "variant {variant_id} does not belong to {}",
                    product.handle
                ))
            })?;
            CartIntent::add(CartMerchandise::from_variant(product, variant), quantity)
        }
        None => CartIntent::LinesAdd {
            lines: vec![CartLineInput::new(variant_id, quantity)],
            previews: Vec::new(),
        },
    };
    intent.validate().map_err(CartError::from)?;
    Ok(intent)
}

/// `base` with an inline error for a failed add.
fn with_add_error(mut base: CartView, key: &CoalescingKey, error: &CartError) -> CartView {
    base.errors.push(CartErrorView {
        key: key.to_string(),
        message: error.user_message(),
    });
    base
}

/// Submit an intent and render the resulting cart contents.
async fn mutate(state: &AppState, session: &Session, intent: CartIntent) -> Result<Response> {
    let outcome = submit(state, session, intent).await?;
    Ok(contents_response(CartView::from_projection(&outcome.view)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
) -> Result<CartPageTemplate> {
    let (cart, root) = with_root(state.sanity(), load_view(&state, &session)).await;
    let cart = cart?;
    let shell = Shell::new(&state, nonce, &root, Some("Cart"), None, "/cart");
    Ok(CartPageTemplate { shell, cart })
}

/// The cart overlay (HTMX).
#[instrument(skip(state, session))]
pub async fn aside(State(state): State<AppState>, session: Session) -> Result<CartAsideTemplate> {
    let cart = load_view(&state, &session).await?;
    Ok(CartAsideTemplate { cart })
}

/// Cart count badge (HTMX).
///
/// Reads the in-memory projection when there is one; the badge degrades to
/// zero instead of failing.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    let Some(cart_id) = session::cart_id(&session).await else {
        return CartCountTemplate { count: 0 };
    };

    let projected = match state.carts().view(&cart_id).await {
        Some(projected) => Some(projected),
        None => state.carts().load(&cart_id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load cart for count");
            None
        }),
    };

    CartCountTemplate {
        count: projected.map_or(0, |projected| projected.cart.total_quantity),
    }
}

/// Add a variant to the cart, creating the cart on first add.
///
/// HTMX requests get the cart overlay back; plain form posts are
/// redirected to the cart page.
#[instrument(skip(state, session, headers, form), fields(handle = %form.handle, variant_id = %form.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let variant_id = MerchandiseId::new(form.variant_id);
    let quantity = form.quantity.unwrap_or(1);
    let product = match state.storefront().get_product_by_handle(&form.handle).await {
        Ok(product) => Some(product),
        Err(e) => {
            tracing::warn!(error = %e, "Product lookup failed, adding without preview");
            None
        }
    };
    let intent = add_intent(product.as_ref(), variant_id.clone(), quantity)?;
    let key = intent.key();

    let existing = session::cart_id(&session).await;
    let submitted = match &existing {
        Some(cart_id) => match state.carts().submit(cart_id, intent).await {
            Ok(outcome) => Some(Ok(CartView::from_projection(&outcome.view))),
            Err(CartError::Missing) => {
                session::clear_cart(&session).await;
                None
            }
            Err(e) => Some(Err(e)),
        },
        None => None,
    };

    let result = match submitted {
        Some(result) => result,
        None => match state
            .carts()
            .create(vec![CartLineInput::new(variant_id, quantity)])
            .await
        {
            Ok(projected) => {
                session::set_cart_id(&session, &projected.cart.id).await;
                Ok(CartView::from_projection(&projected))
            }
            Err(e) => Err(e),
        },
    };

    let cart = match result {
        Ok(cart) => cart,
        Err(CartError::Intent(e)) => return Err(CartError::Intent(e).into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add to cart");
            let base = match &existing {
                Some(cart_id) => state
                    .carts()
                    .view(cart_id)
                    .await
                    .map(|projected| CartView::from_projection(&projected))
                    .unwrap_or_default(),
                None => CartView::default(),
            };
            with_add_error(base, &key, &e)
        }
    };

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED)]),
        CartAsideTemplate { cart },
    )
        .into_response())
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(state, session, form), fields(line_id = %form.line_id, quantity = form.quantity))]
pub async fn update_line(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateLineForm>,
) -> Result<Response> {
    let intent = CartIntent::set_quantity(CartLineId::new(form.line_id), form.quantity);
    mutate(&state, &session, intent).await
}

#[instrument(skip(state, session, form), fields(line_id = %form.line_id))]
pub async fn remove_line(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveLineForm>,
) -> Result<Response> {
    let intent = CartIntent::LinesRemove {
        line_ids: vec![CartLineId::new(form.line_id)],
    };
    mutate(&state, &session, intent).await
}

/// Current discount codes, from the projection when one is loaded.
async fn current_discount_codes(state: &AppState, cart_id: &CartId) -> Result<Vec<String>> {
    let projected = match state.carts().view(cart_id).await {
        Some(projected) => Some(projected),
        None => state.carts().load(cart_id).await?,
    };
    Ok(projected
        .map(|projected| {
            projected
                .cart
                .discount_codes
                .into_iter()
                .map(|discount| discount.code)
                .collect()
        })
        .unwrap_or_default())
}

/// Apply a discount code on top of the existing ones.
#[instrument(skip(state, session, form))]
pub async fn add_discount(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CodeForm>,
) -> Result<Response> {
    let cart_id = require_cart(&session).await?;
    let mut codes = current_discount_codes(&state, &cart_id).await?;
    codes.push(form.code);
    mutate(&state, &session, CartIntent::discount_codes(codes)).await
}

#[instrument(skip(state, session, form))]
pub async fn remove_discount(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CodeForm>,
) -> Result<Response> {
    let cart_id = require_cart(&session).await?;
    let codes = current_discount_codes(&state, &cart_id)
        .await?
        .into_iter()
        .filter(|code| !code.eq_ignore_ascii_case(form.code.trim()));
    mutate(&state, &session, CartIntent::discount_codes(codes)).await
}

/// Apply a gift card code.
///
/// The platform replaces the whole set on update, so previously entered
/// codes are resent; they are kept in the session once applied.
#[instrument(skip(state, session, form))]
pub async fn add_gift_card(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CodeForm>,
) -> Result<Response> {
    let mut codes = session::gift_card_codes(&session).await;
    codes.push(form.code);

    let outcome = submit(&state, &session, CartIntent::gift_card_codes(&codes)).await?;
    if matches!(outcome.settlement, Settlement::Applied) {
        session::set_gift_card_codes(&session, &codes).await;
    }
    Ok(contents_response(CartView::from_projection(&outcome.view)))
}

#[instrument(skip(state, session, form), fields(gift_card_id = %form.id))]
pub async fn remove_gift_card(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GiftCardRemoveForm>,
) -> Result<Response> {
    let intent = CartIntent::GiftCardCodesRemove {
        ids: vec![GiftCardId::new(form.id)],
    };
    mutate(&state, &session, intent).await
}

/// Dismiss an inline cart error.
#[instrument(skip(state, session, form), fields(key = %form.key))]
pub async fn dismiss_error(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DismissErrorForm>,
) -> Result<Response> {
    let cart_id = require_cart(&session).await?;
    let key = CoalescingKey::from(form.key.as_str());

    let cart = match state.carts().dismiss_error(&cart_id, &key).await {
        Some(projected) => CartView::from_projection(&projected),
        None => load_view(&state, &session).await?,
    };
    Ok(CartContentsTemplate { cart }.into_response())
}

/// Redirect to the platform's checkout, or back to the cart when empty.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let cart = load_view(&state, &session).await?;
    Ok(match cart.checkout_url {
        Some(url) if !cart.is_empty() => Redirect::to(&url),
        _ => Redirect::to("/cart"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::shopify::ShopifyError;
    use crate::shopify::types::tests::{product, variant};

    #[test]
    fn test_htmx_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_add_intent_previews_the_variant() {
        let product = product(vec![variant("a", true), variant("b", true)]);

        let intent = add_intent(Some(&product), MerchandiseId::new("b"), 2).unwrap();

        let CartIntent::LinesAdd { lines, previews } = intent else {
            panic!("expected a lines add");
        };
        assert_eq!(lines, vec![CartLineInput::new(MerchandiseId::new("b"), 2)]);
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].id.as_str(), "b");
        assert_eq!(previews[0].product.handle, "linen-shirt");
        assert_eq!(
            previews[0].image.as_ref().unwrap().url,
            "https://cdn.shopify.com/a.jpg"
        );
    }

    #[test]
    fn test_add_intent_rejects_a_variant_of_another_product() {
        let product = product(vec![variant("a", true)]);
        let result = add_intent(Some(&product), MerchandiseId::new("z"), 1);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_add_intent_without_product_skips_preview() {
        let intent = add_intent(None, MerchandiseId::new("a"), 1).unwrap();
        assert!(matches!(
            intent,
            CartIntent::LinesAdd { ref previews, .. } if previews.is_empty()
        ));

        let result = add_intent(None, MerchandiseId::new("a"), 0);
        assert!(matches!(result, Err(AppError::Cart(CartError::Intent(_)))));
    }

    #[test]
    fn test_failed_add_keeps_the_cart_and_reports_inline() {
        let base = CartView {
            total_quantity: 3,
            ..CartView::default()
        };
        let key = CartIntent::add(
            CartMerchandise::from_variant(&product(vec![variant("a", true)]), &variant("a", true)),
            1,
        )
        .key();
        let error = CartError::from(ShopifyError::RateLimited(60));

        let view = with_add_error(base, &key, &error);

        assert_eq!(view.total_quantity, 3);
        assert_eq!(view.errors.len(), 1);
        assert_eq!(view.errors[0].key, key.to_string());
        assert_eq!(
            view.errors[0].message,
            "Too many requests. Please try again in a moment."
        );
    }

    #[test]
    fn test_contents_response_triggers_badge_refresh() {
        let response = contents_response(CartView::default());
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            CART_UPDATED
        );
    }
}

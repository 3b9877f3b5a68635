//! Values kept in the visitor's session.
//!
//! Session read and write failures are logged and treated as an absent
//! value: losing the cart id only means the next add starts a new cart.

use luneva_core::types::CartId;
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// The commerce platform's cart id.
    pub const CART_ID: &str = "cart_id";

    /// Gift card codes entered for the current cart. The platform replaces
    /// the whole set on every update, so previously entered codes are resent.
    pub const GIFT_CARD_CODES: &str = "gift_card_codes";
}

pub async fn cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<String>(keys::CART_ID)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read cart id from session");
            None
        })
        .map(CartId::new)
}

pub async fn set_cart_id(session: &Session, cart_id: &CartId) {
    if let Err(e) = session.insert(keys::CART_ID, cart_id.as_str()).await {
        tracing::warn!(error = %e, "Failed to store cart id in session");
    }
}

/// Forget the cart and everything tied to it.
pub async fn clear_cart(session: &Session) {
    for key in [keys::CART_ID, keys::GIFT_CARD_CODES] {
        if let Err(e) = session.remove::<serde_json::Value>(key).await {
            tracing::warn!(error = %e, key, "Failed to clear session value");
        }
    }
}

pub async fn gift_card_codes(session: &Session) -> Vec<String> {
    session
        .get::<Vec<String>>(keys::GIFT_CARD_CODES)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read gift card codes from session");
            None
        })
        .unwrap_or_default()
}

pub async fn set_gift_card_codes(session: &Session, codes: &[String]) {
    if let Err(e) = session.insert(keys::GIFT_CARD_CODES, codes).await {
        tracing::warn!(error = %e, "Failed to store gift card codes in session");
    }
}

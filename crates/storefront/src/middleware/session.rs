//! Session layer.
//!
//! Sessions live in memory; they only carry the cart id and the gift card
//! codes entered for that cart, both recoverable by starting a new cart.
//! The session cookie is signed with a key derived from
//! `STOREFRONT_SESSION_SECRET`, so a tampered id is treated as no session.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

pub const SESSION_COOKIE_NAME: &str = "luneva_session";

/// Seven days of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookie signing key: the SHA-512 digest of the secret fills the 64 bytes
/// the key needs.
fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

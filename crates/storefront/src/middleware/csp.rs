//! Per-request CSP nonce.
//!
//! The only inline content the storefront emits is the `<style>` block
//! carrying the theme's `@font-face` rules; it is tagged with this nonce and
//! the nonce is echoed in the `style-src` directive.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// 128-bit random nonce, base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Store a fresh nonce in the request extensions.
///
/// Must run before `security_headers_middleware`, which reads the nonce
/// back out to build the policy.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce missing from request extensions");
            Self(String::new())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_are_unique_and_sized() {
        let first = CspNonce::generate();
        let second = CspNonce::generate();
        assert_ne!(first, second);
        assert_eq!(first.value().len(), 24);
    }
}

//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (span field, Sentry tag, response header)
//! 4. CSP nonce (per-request nonce for the inline font stylesheet)
//! 5. Security headers (CSP built from the nonce, isolation headers)
//! 6. Session layer (in-memory store; carries the cart id)
//!
//! Cart mutation routes additionally sit behind a per-IP rate limiter.

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::cart_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;

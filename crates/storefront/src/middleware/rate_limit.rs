//! Rate limiting for cart mutations using governor and `tower_governor`.
//!
//! Page views are cached upstream and not limited. Cart mutations hit the
//! commerce API on every request, so they are limited per client IP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP from proxy headers, in order of trust: `CF-Connecting-IP`,
/// the first `X-Forwarded-For` hop, then `X-Real-IP`. Without any of them
/// the peer address is used, which requires serving with connect info.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        CLIENT_IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.split(',').next())
                    .and_then(|value| value.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// About one mutation per second per IP with a burst of 30, enough for
/// rapid quantity clicks.
///
/// # Panics
///
/// Does not panic: `per_second(1)` and `burst_size(30)` are valid.
#[must_use]
pub fn cart_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(1)
        .burst_size(30)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(30) is valid");
    GovernorLayer::new(Arc::new(config))
}

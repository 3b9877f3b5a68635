//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PUBLIC_SANITY_PROJECT_ID` - Sanity project ID
//! - `PUBLIC_SANITY_DATASET` - Sanity dataset (e.g., production)
//! - `PUBLIC_STORE_DOMAIN` - Public storefront domain (e.g., luneva.com)
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `PUBLIC_STOREFRONT_API_TOKEN` - Storefront API public access token
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `PUBLIC_SANITY_API_VERSION` - Content API version (default: 2024-12-25)
//! - `SANITY_API_TOKEN` - Read token; queries go to the live API instead of the CDN
//! - `SHOPIFY_API_VERSION` - Storefront API version (default: 2025-01)
//! - `PUBLIC_CHECKOUT_DOMAIN` - Checkout domain, treated as an own domain for links
//! - `SHOPIFY_CUSTOMER_SHOP_ID` - Numeric shop ID for the hosted account pages
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `https://{PUBLIC_STORE_DOMAIN}`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: production)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SANITY_API_VERSION: &str = "2024-12-25";
const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-01";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Public storefront domain, used for own-domain link rewriting
    pub public_domain: String,
    /// Checkout domain, if different from the storefront's
    pub checkout_domain: Option<String>,
    /// Secret the session cookie signing key is derived from
    pub session_secret: SecretString,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Sanity content API configuration
    pub sanity: SanityConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: String,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API public access token
    pub storefront_token: SecretString,
    /// Numeric shop ID used by the hosted customer account pages
    pub customer_shop_id: Option<String>,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field("customer_shop_id", &self.customer_shop_id)
            .finish()
    }
}

/// Sanity content API configuration.
#[derive(Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Read token. When set, queries bypass the CDN.
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SanityConfig {
    /// Query endpoint for the configured dataset.
    ///
    /// Token-authenticated reads use the live API since the CDN does not
    /// serve private datasets.
    #[must_use]
    pub fn query_endpoint(&self) -> String {
        let host = if self.api_token.is_some() {
            "api.sanity.io"
        } else {
            "apicdn.sanity.io"
        };
        format!(
            "https://{}.{host}/v{}/data/query/{}",
            self.project_id, self.api_version, self.dataset
        )
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint of the Storefront API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store, self.api_version
        )
    }

    /// URL of the hosted customer account pages, when a shop ID is configured.
    #[must_use]
    pub fn account_url(&self) -> Option<String> {
        self.customer_shop_id
            .as_deref()
            .map(|shop_id| format!("https://shopify.com/{shop_id}/account"))
    }

    /// Hosted customer account sign-out endpoint.
    #[must_use]
    pub fn account_logout_url(&self) -> Option<String> {
        self.customer_shop_id
            .as_deref()
            .map(|shop_id| format!("https://shopify.com/authentication/{shop_id}/logout"))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let public_domain = get_required_env("PUBLIC_STORE_DOMAIN")?;
        let base_url = get_optional_env("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("https://{public_domain}"));
        let checkout_domain = get_optional_env("PUBLIC_CHECKOUT_DOMAIN");

        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let sanity = SanityConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_env_or_default("SENTRY_ENVIRONMENT", "production");

        Ok(Self {
            host,
            port,
            base_url,
            public_domain,
            checkout_domain,
            session_secret,
            shopify,
            sanity,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Every domain that counts as "ours" when resolving absolute links.
    #[must_use]
    pub fn own_domains(&self) -> Vec<String> {
        let mut domains = vec![self.public_domain.clone(), self.shopify.store.clone()];
        domains.extend(self.checkout_domain.iter().cloned());
        domains
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE")?;
        if store.contains("://") {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE".to_string(),
                "expected a bare domain such as your-store.myshopify.com".to_string(),
            ));
        }
        Ok(Self {
            store,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            storefront_token: get_required_secret("PUBLIC_STOREFRONT_API_TOKEN")?,
            customer_shop_id: get_optional_env("SHOPIFY_CUSTOMER_SHOP_ID"),
        })
    }
}

impl SanityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: get_required_env("PUBLIC_SANITY_PROJECT_ID")?,
            dataset: get_required_env("PUBLIC_SANITY_DATASET")?,
            api_version: get_env_or_default(
                "PUBLIC_SANITY_API_VERSION",
                DEFAULT_SANITY_API_VERSION,
            ),
            api_token: get_optional_env("SANITY_API_TOKEN").map(SecretString::from),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable. Blank values count as missing.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS
        .iter()
        .find(|pattern| lower.contains(**pattern))
    {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: "luneva.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            storefront_token: SecretString::from("storefront_token_value"),
            customer_shop_id: Some("60123456789".to_string()),
        }
    }

    fn sanity_config(token: Option<&str>) -> SanityConfig {
        SanityConfig {
            project_id: "abc123".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-12-25".to_string(),
            api_token: token.map(SecretString::from),
        }
    }

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            public_domain: "luneva.com".to_string(),
            checkout_domain: Some("checkout.luneva.com".to_string()),
            session_secret: SecretString::from("x".repeat(32)),
            shopify: shopify_config(),
            sanity: sanity_config(None),
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-session-key-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err =
            validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_own_domains_include_store_and_checkout() {
        assert_eq!(
            config().own_domains(),
            vec!["luneva.com", "luneva.myshopify.com", "checkout.luneva.com"]
        );
    }

    #[test]
    fn test_sanity_endpoint_uses_cdn_without_token() {
        assert_eq!(
            sanity_config(None).query_endpoint(),
            "https://abc123.apicdn.sanity.io/v2024-12-25/data/query/production"
        );
        assert_eq!(
            sanity_config(Some("tok")).query_endpoint(),
            "https://abc123.api.sanity.io/v2024-12-25/data/query/production"
        );
    }

    #[test]
    fn test_shopify_endpoint_and_account_url() {
        let shopify = shopify_config();
        assert_eq!(
            shopify.endpoint(),
            "https://luneva.myshopify.com/api/2025-01/graphql.json"
        );
        assert_eq!(
            shopify.account_url().as_deref(),
            Some("https://shopify.com/60123456789/account")
        );
        assert_eq!(
            shopify.account_logout_url().as_deref(),
            Some("https://shopify.com/authentication/60123456789/logout")
        );
    }

    #[test]
    fn test_config_debug_redacts_tokens() {
        let mut config = config();
        config.sanity = sanity_config(Some("sanity_token_value"));
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("luneva.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("storefront_token_value"));
        assert!(!debug_output.contains("sanity_token_value"));
    }
}

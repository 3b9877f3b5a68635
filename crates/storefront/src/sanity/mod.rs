//! Sanity content API client.
//!
//! Issues GROQ queries over HTTP GET and decodes the `{ "result": ... }`
//! envelope into the core crate's content documents. Query results are
//! cached with `moka` for one minute, keyed by the query text.

pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use luneva_core::content::{About, Faq, Footer, Header, Hero, HomePage, Settings, VideoBanner};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::SanityConfig;

/// Errors that can occur when querying the content API.
#[derive(Debug, Error)]
pub enum SanityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Content API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response or the document did not decode.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Client for the Sanity query API.
#[derive(Clone)]
pub struct SanityClient {
    inner: Arc<SanityClientInner>,
}

struct SanityClientInner {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    cache: Cache<&'static str, Arc<Value>>,
}

impl SanityClient {
    /// Create a new content API client.
    #[must_use]
    pub fn new(config: &SanityConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(60))
            .build();

        Self {
            inner: Arc::new(SanityClientInner {
                client: reqwest::Client::new(),
                endpoint: config.query_endpoint(),
                token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// Run a GROQ query and return the raw `result` value.
    async fn query(&self, query: &'static str) -> Result<Arc<Value>, SanityError> {
        if let Some(result) = self.inner.cache.get(query).await {
            debug!("Cache hit for content query");
            return Ok(result);
        }

        let url = Url::parse_with_params(&self.inner.endpoint, &[("query", query)])?;
        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Content API returned non-success status"
            );
            return Err(SanityError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let response: QueryResponse = serde_json::from_str(&body)?;
        let result = Arc::new(response.result);
        self.inner.cache.insert(query, Arc::clone(&result)).await;
        Ok(result)
    }

    /// Fetch a single document; `null` results become `None`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &'static str,
    ) -> Result<Option<T>, SanityError> {
        let result = self.query(query).await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(T::deserialize(result.as_ref())?))
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_header(&self) -> Result<Option<Header>, SanityError> {
        self.fetch(queries::HEADER).await
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_footer(&self) -> Result<Option<Footer>, SanityError> {
        self.fetch(queries::FOOTER).await
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_settings(&self) -> Result<Option<Settings>, SanityError> {
        self.fetch(queries::SETTINGS).await
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_home_page(&self) -> Result<Option<HomePage>, SanityError> {
        self.fetch(queries::HOME_PAGE).await
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_about(&self) -> Result<Option<About>, SanityError> {
        self.fetch(queries::ABOUT).await
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_faq(&self) -> Result<Option<Faq>, SanityError> {
        self.fetch(queries::FAQ).await
    }

    /// The hero currently flagged active, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_active_hero(&self) -> Result<Option<Hero>, SanityError> {
        self.fetch(queries::ACTIVE_HERO).await
    }

    /// The video banner currently flagged active, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document does not decode.
    #[instrument(skip(self))]
    pub async fn get_active_video_banner(&self) -> Result<Option<VideoBanner>, SanityError> {
        self.fetch(queries::ACTIVE_VIDEO_BANNER).await
    }
}

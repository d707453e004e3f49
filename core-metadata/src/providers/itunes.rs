//! iTunes Search API Client
//!
//! Finds cover art for "Artist - Title" stream metadata.
//!
//! ## API Endpoint
//!
//! - **Search**: `https://itunes.apple.com/search?term={term}&entity=song&limit=1`
//!
//! Results carry an `artworkUrl100` pointing at a 100×100 rendition; the
//! CDN serves other sizes when the `100x100bb` path segment is rewritten.
//!
//! ## Rate Limiting
//!
//! The public search endpoint allows roughly 20 requests per minute per
//! client. A minimum delay between requests is enforced.

use crate::artwork::{ArtworkLookup, StreamMetadata};
use crate::error::{MetadataError, Result};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

const ITUNES_SEARCH_BASE: &str = "https://itunes.apple.com/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const ARTWORK_SIZE_TOKEN: &str = "100x100bb";

/// iTunes search client implementing [`ArtworkLookup`].
pub struct ItunesArtworkClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    country: Option<String>,
    rate_limiter: Mutex<RateLimiter>,
}

/// Enforces a minimum delay between requests
struct RateLimiter {
    last_request: Option<Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(delay_ms: u64) -> Self {
        Self {
            last_request: None,
            min_delay: Duration::from_millis(delay_ms),
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    artwork_url100: Option<String>,
}

impl ItunesArtworkClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_rate_limit(http_client, 250)
    }

    pub fn with_rate_limit(http_client: Arc<dyn HttpClient>, rate_limit_delay_ms: u64) -> Self {
        Self {
            http_client,
            base_url: ITUNES_SEARCH_BASE.to_string(),
            country: None,
            rate_limiter: Mutex::new(RateLimiter::new(rate_limit_delay_ms)),
        }
    }

    /// Restrict results to a storefront, e.g. `"US"`.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Point the client at a different search endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self, term: &str) -> String {
        let mut url = format!(
            "{}?term={}&entity=song&limit=1",
            self.base_url,
            urlencoding::encode(term)
        );
        if let Some(country) = &self.country {
            url.push_str("&country=");
            url.push_str(&urlencoding::encode(country));
        }
        url
    }

    async fn search(&self, term: &str) -> Result<Option<String>> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::get(self.search_url(term))
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::NetworkError(format!("iTunes search failed: {}", e)))?;

        if !response.is_success() {
            if response.status == 403 || response.status == 429 {
                let retry_after = response
                    .headers
                    .get("Retry-After")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(MetadataError::RateLimited {
                    provider: "iTunes".to_string(),
                    retry_after_seconds: retry_after,
                });
            }

            return Err(MetadataError::HttpError {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let parsed: SearchResponse = serde_json::from_slice(&response.body).map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse iTunes response: {}", e))
        })?;

        Ok(parsed
            .results
            .into_iter()
            .find_map(|result| result.artwork_url100)
            .filter(|url| !url.is_empty()))
    }
}

/// Rewrite the size segment of an iTunes artwork URL.
pub fn resize_artwork_url(url: &str, size: u32) -> String {
    url.replace(ARTWORK_SIZE_TOKEN, &format!("{}x{}bb", size, size))
}

#[async_trait]
impl ArtworkLookup for ItunesArtworkClient {
    #[instrument(skip(self), fields(provider = "itunes"))]
    async fn lookup(&self, query: &str, size: u32) -> Result<Option<String>> {
        let metadata = StreamMetadata::parse(query);
        if metadata.is_blank() {
            return Err(MetadataError::InvalidQuery("empty metadata".to_string()));
        }

        match self.search(&metadata.search_term()).await {
            Ok(Some(url)) => {
                info!("Found artwork on iTunes");
                Ok(Some(resize_artwork_url(&url, size)))
            }
            Ok(None) => {
                debug!("No artwork found on iTunes");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "iTunes artwork lookup failed");
                Err(e)
            }
        }
    }
}

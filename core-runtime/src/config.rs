//! # Core Configuration Module
//!
//! Builder-based configuration holding the host bridges and feature flags
//! the playback core is wired with.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - progressive downloads and artwork lookups
//!   (desktop default: reqwest)
//!
//! ## Optional Dependencies
//!
//! - `NetworkMonitor` - connectivity edges for stall recovery
//!   (desktop default when network awareness is enabled)
//! - `CacheStore` - persisted static assets; without one every static
//!   asset is fetched from the network
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .cache_store(Arc::new(MyCacheStore))
//!     .enable_artwork_remote(true)
//!     .build()?;
//! ```
//!
//! Missing required bridges fail fast with [`Error::CapabilityMissing`].

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{CacheStore, HttpClient, NetworkMonitor};
use std::sync::Arc;

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub http_client: Arc<dyn HttpClient>,
    pub network_monitor: Option<Arc<dyn NetworkMonitor>>,
    pub cache_store: Option<Arc<dyn CacheStore>>,
    pub features: FeatureFlags,
    pub artwork_api_config: ArtworkApiConfig,
    /// Capacity of the broadcast event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field(
                "network_monitor",
                &self.network_monitor.as_ref().map(|_| "NetworkMonitor { ... }"),
            )
            .field(
                "cache_store",
                &self.cache_store.as_ref().map(|_| "CacheStore { ... }"),
            )
            .field("features", &self.features)
            .field("artwork_api_config", &self.artwork_api_config)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Look up artwork remotely when stream metadata changes
    pub enable_artwork_remote: bool,

    /// Observe connectivity to drive stall recovery (requires NetworkMonitor)
    pub enable_network_awareness: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_artwork_remote: true,
            enable_network_awareness: false,
        }
    }
}

/// Settings for the remote artwork search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkApiConfig {
    /// Storefront country code sent with searches, e.g. `US`
    pub country: Option<String>,
    /// Minimum delay between two searches, in milliseconds
    pub rate_limit_delay_ms: u64,
}

impl Default for ArtworkApiConfig {
    fn default() -> Self {
        Self {
            country: None,
            rate_limit_delay_ms: 250,
        }
    }
}

impl ArtworkApiConfig {
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_rate_limit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.rate_limit_delay_ms = delay_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(country) = &self.country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::Config(format!(
                    "Artwork country must be a two-letter code, got '{}'",
                    country
                )));
            }
        }
        if self.rate_limit_delay_ms > 60_000 {
            return Err(Error::Config(
                "Artwork rate limit delay exceeds 60 seconds".to_string(),
            ));
        }
        Ok(())
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks that feature flags are consistent with the provided bridges.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.features.enable_network_awareness && self.network_monitor.is_none() {
            return Err(Error::Config(
                "Network awareness enabled but no NetworkMonitor provided. \
                 Disable the feature or inject a NetworkMonitor implementation."
                    .to_string(),
            ));
        }

        self.artwork_api_config.validate()
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client: Arc<dyn HttpClient> = Arc::new(bridge_desktop::ReqwestHttpClient::new());
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                  Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                  Mobile: inject a platform-native adapter."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_network_monitor() -> Option<Arc<dyn NetworkMonitor>> {
    let monitor: Arc<dyn NetworkMonitor> = Arc::new(bridge_desktop::DesktopNetworkMonitor::new());
    Some(monitor)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_network_monitor() -> Option<Arc<dyn NetworkMonitor>> {
    None
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    features: FeatureFlags,
    artwork_api_config: Option<ArtworkApiConfig>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Setting a monitor also enables network awareness.
    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self.features.enable_network_awareness = true;
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn enable_artwork_remote(mut self, enabled: bool) -> Self {
        self.features.enable_artwork_remote = enabled;
        self
    }

    pub fn enable_network_awareness(mut self, enabled: bool) -> Self {
        self.features.enable_network_awareness = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn artwork_api_config(mut self, config: ArtworkApiConfig) -> Self {
        self.artwork_api_config = Some(config);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Build and validate the configuration.
    ///
    /// With `desktop-shims`, a missing HTTP client and (when network
    /// awareness is on) a missing network monitor are replaced by the
    /// desktop defaults.
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let network_monitor = match self.network_monitor {
            Some(monitor) => Some(monitor),
            None if self.features.enable_network_awareness => provide_default_network_monitor(),
            None => None,
        };

        let config = CoreConfig {
            http_client,
            network_monitor,
            cache_store: self.cache_store,
            features: self.features,
            artwork_api_config: self.artwork_api_config.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}

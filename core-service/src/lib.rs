//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP transport,
//! connectivity monitor, cache store) and the host's playback engine into a
//! running [`RadioPlayer`]. Desktop apps typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`].
//!
//! ```ignore
//! use core_playback::{PlayerConfig, Resource};
//!
//! let core = core_service::bootstrap_desktop()?;
//! let mut events = core.subscribe();
//! let player = core.spawn_player(engine, PlayerConfig::default())?;
//! player.set_resource(Some(Resource::LiveFeed(url)))?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{CacheStore, PlaybackEngine};
use core_metadata::ArtworkLookup;
use core_playback::{EventBusDelegate, MemoryCacheStore, PlayerConfig, RadioPlayer, RadioPlayerBuilder};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use tracing::{debug, info};

/// Entries kept by the artwork lookup memo.
const ARTWORK_CACHE_CAPACITY: usize = 64;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    cache_store: Arc<dyn CacheStore>,
    event_bus: EventBus,
}

impl CoreService {
    /// Create a service from a validated configuration.
    ///
    /// Without a host cache store, completed static assets are kept in an
    /// in-memory LRU store.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let cache_store = match &config.cache_store {
            Some(store) => Arc::clone(store),
            None => {
                debug!("No cache store provided, using in-memory store");
                Arc::new(MemoryCacheStore::default()) as Arc<dyn CacheStore>
            }
        };
        let event_bus = EventBus::new(config.event_buffer_size);

        Ok(Self {
            config: Arc::new(config),
            cache_store,
            event_bus,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Subscribe to player and download events.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Remote artwork lookup, when enabled by both the feature flag and the
    /// `artwork-remote` cargo feature.
    pub fn artwork_lookup(&self) -> Option<Arc<dyn ArtworkLookup>> {
        if !self.config.features.enable_artwork_remote {
            return None;
        }
        remote_artwork_lookup(&self.config)
    }

    /// Player builder wired with this service's bridges.
    ///
    /// Notifications go to the event bus; override with
    /// [`RadioPlayerBuilder::delegate`].
    pub fn player_builder(
        &self,
        engine: Arc<dyn PlaybackEngine>,
        player_config: PlayerConfig,
    ) -> RadioPlayerBuilder {
        let enable_artwork = player_config.enable_artwork;
        let mut builder = RadioPlayer::builder(engine, Arc::clone(&self.config.http_client))
            .config(player_config)
            .cache_store(Arc::clone(&self.cache_store))
            .event_bus(self.event_bus.clone())
            .delegate(Arc::new(EventBusDelegate::new(self.event_bus.clone())));

        if self.config.features.enable_network_awareness {
            if let Some(monitor) = &self.config.network_monitor {
                builder = builder.network_monitor(Arc::clone(monitor));
            }
        }
        if enable_artwork {
            if let Some(lookup) = self.artwork_lookup() {
                builder = builder.artwork_lookup(lookup);
            }
        }
        builder
    }

    /// Spawn a player on the current tokio runtime.
    pub fn spawn_player(
        &self,
        engine: Arc<dyn PlaybackEngine>,
        player_config: PlayerConfig,
    ) -> Result<RadioPlayer> {
        let player = self.player_builder(engine, player_config).spawn()?;
        info!("Player started");
        Ok(player)
    }
}

#[cfg(feature = "artwork-remote")]
fn remote_artwork_lookup(config: &CoreConfig) -> Option<Arc<dyn ArtworkLookup>> {
    use core_metadata::providers::ItunesArtworkClient;
    use core_metadata::CachedArtworkLookup;

    let api = &config.artwork_api_config;
    let mut client =
        ItunesArtworkClient::with_rate_limit(Arc::clone(&config.http_client), api.rate_limit_delay_ms);
    if let Some(country) = &api.country {
        client = client.with_country(country.clone());
    }
    Some(Arc::new(CachedArtworkLookup::new(
        Arc::new(client),
        ARTWORK_CACHE_CAPACITY,
    )))
}

#[cfg(not(feature = "artwork-remote"))]
fn remote_artwork_lookup(_config: &CoreConfig) -> Option<Arc<dyn ArtworkLookup>> {
    None
}

/// Convenience bootstrapper for desktop hosts: reqwest transport and, when
/// network awareness is on, the reachability monitor.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> Result<CoreService> {
    let config = CoreConfig::builder()
        .enable_network_awareness(true)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    CoreService::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, StreamingResponse};
    use bridge_traits::{BridgeError, EngineEventSink, EngineItem};
    use bytes::Bytes;
    use std::collections::HashMap;

    struct OfflineHttp;

    #[async_trait]
    impl HttpClient for OfflineHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }

        async fn open_stream(&self, _request: HttpRequest) -> BridgeResult<StreamingResponse> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }
    }

    struct SilentEngine;

    #[async_trait]
    impl PlaybackEngine for SilentEngine {
        fn set_event_sink(&self, _sink: EngineEventSink) {}
        fn replace_current_item(&self, _item: Option<EngineItem>) {}
        fn play(&self) {}
        fn pause(&self) {}
        fn rate(&self) -> f32 {
            0.0
        }
        fn is_playback_likely_to_keep_up(&self) -> bool {
            true
        }
        async fn probe_playable(
            &self,
            _url: &str,
            _headers: &HashMap<String, String>,
        ) -> BridgeResult<bool> {
            Ok(false)
        }
    }

    fn service(enable_artwork: bool) -> CoreService {
        let config = CoreConfig::builder()
            .http_client(Arc::new(OfflineHttp))
            .enable_artwork_remote(enable_artwork)
            .build()
            .unwrap();
        CoreService::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_default_cache_store_is_in_memory() {
        let core = service(false);
        core.cache_store
            .put("http://x/a.mp3", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert!(core.cache_store.contains("http://x/a.mp3").await.unwrap());
    }

    #[test]
    fn test_artwork_lookup_follows_feature_flag() {
        assert!(service(false).artwork_lookup().is_none());
        assert_eq!(
            service(true).artwork_lookup().is_some(),
            cfg!(feature = "artwork-remote")
        );
    }

    #[tokio::test]
    async fn test_player_events_reach_subscribers() {
        let core = service(false);
        let mut events = core.subscribe();
        let player = core
            .spawn_player(Arc::new(SilentEngine), PlayerConfig::default())
            .unwrap();

        player
            .set_resource(Some(core_playback::Resource::LiveFeed(
                "http://x/live".to_string(),
            )))
            .unwrap();
        player.flush().await.unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.description(), "Resource changed");
    }
}

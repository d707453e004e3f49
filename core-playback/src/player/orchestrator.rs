//! # Playback Orchestrator
//!
//! Single task owning the current resource, its pipeline and both state
//! machines. Every input is a message:
//!
//! ```text
//!  RadioPlayer ──Command──┐
//!  PlaybackEngine ─Event──┤
//!  ResourceLoaderBridge ──┼──> Orchestrator::run ──> PlayerDelegate
//!  spawned completions ───┘         │
//!  (cache, probe, artwork,          └──> PlaybackEngine / EventBus
//!   recovery timer, network)
//! ```
//!
//! Asynchronous work is spawned and reports back through `Internal`
//! messages tagged with the generation (resource assignment), cycle
//! (recovery) or sequence (artwork) it was started for. Anything tagged
//! with a superseded number is discarded.

use super::delegate::PlayerDelegate;
use super::state::{transition, AudioOutputClaim, PlaybackState, PlayerState};
use crate::config::PlayerConfig;
use crate::error::{PlaybackError, Result};
use crate::loader::{LoaderEvent, LoaderEventKind, LoaderEventSender, ResourceLoaderBridge};
use crate::resource::Resource;
use bridge_traits::http::HttpClient;
use bridge_traits::network::NetworkInfo;
use bridge_traits::{
    CacheStore, DataSource, EngineEvent, EngineEventKind, EngineItem, EngineItemId,
    PlaybackEngine,
};
use bytes::Bytes;
use core_metadata::{ArtworkLookup, StreamMetadata};
use core_runtime::events::{CoreEvent, DownloadEvent, EventBus};
use core_runtime::logging::redact_url;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

/// Requests from the [`RadioPlayer`](super::RadioPlayer) handle.
#[derive(Debug)]
pub(crate) enum Command {
    SetResource(Option<Resource>),
    Play,
    Pause,
    Stop,
    Toggle,
    /// Answered once every message queued before it has been handled.
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Completions of work spawned by the orchestrator.
#[derive(Debug)]
pub(crate) enum Internal {
    CacheLookup {
        generation: u64,
        result: Result<Option<Bytes>>,
    },
    Validation {
        generation: u64,
        result: Result<bool>,
    },
    Artwork {
        seq: u64,
        url: Option<String>,
    },
    RecoveryTimer {
        cycle: u64,
    },
    Network(NetworkInfo),
}

/// State readable from the handle without a round trip to the task.
#[derive(Debug, Clone)]
pub(crate) struct PlayerSnapshot {
    pub player_state: PlayerState,
    pub playback_state: PlaybackState,
    pub resource: Option<Resource>,
    pub metadata: Option<StreamMetadata>,
    pub artwork_url: Option<String>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            player_state: PlayerState::UrlNotSet,
            playback_state: PlaybackState::Stopped,
            resource: None,
            metadata: None,
            artwork_url: None,
        }
    }
}

/// Collaborators and shared state handed over by the builder.
pub(crate) struct OrchestratorParts {
    pub config: PlayerConfig,
    pub engine: Arc<dyn PlaybackEngine>,
    pub http_client: Arc<dyn HttpClient>,
    pub cache: Option<Arc<dyn CacheStore>>,
    pub artwork: Option<Arc<dyn ArtworkLookup>>,
    pub delegate: Arc<dyn PlayerDelegate>,
    pub event_bus: Option<EventBus>,
    pub snapshot: Arc<RwLock<PlayerSnapshot>>,
    pub internal_tx: mpsc::UnboundedSender<Internal>,
    pub loader_tx: LoaderEventSender,
    pub network_task: Option<JoinHandle<()>>,
}

/// Bridge plus the engine item currently reading from it.
struct Pipeline {
    bridge: ResourceLoaderBridge,
    content_type: String,
    /// `None` while detached by `stop()`
    item: Option<EngineItemId>,
    /// Ready state reported by the engine but not yet backed by the
    /// first requested range.
    deferred_ready: Option<PlayerState>,
}

struct Recovery {
    cycle: u64,
    timer: JoinHandle<()>,
}

pub(crate) struct Orchestrator {
    config: PlayerConfig,
    engine: Arc<dyn PlaybackEngine>,
    http_client: Arc<dyn HttpClient>,
    cache: Option<Arc<dyn CacheStore>>,
    artwork: Option<Arc<dyn ArtworkLookup>>,
    delegate: Arc<dyn PlayerDelegate>,
    event_bus: Option<EventBus>,
    snapshot: Arc<RwLock<PlayerSnapshot>>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    loader_tx: LoaderEventSender,
    network_task: Option<JoinHandle<()>>,

    resource: Option<Resource>,
    generation: u64,
    /// Cache lookup or playability probe for the current generation
    preparing: Option<JoinHandle<()>>,
    pipeline: Option<Pipeline>,

    player_state: PlayerState,
    playback_state: PlaybackState,

    connected: bool,
    recovery: Option<Recovery>,
    recovery_cycle: u64,

    metadata: Option<StreamMetadata>,
    artwork_url: Option<String>,
    artwork_seq: u64,
    artwork_task: Option<JoinHandle<()>>,
}

impl Orchestrator {
    pub(crate) fn new(parts: OrchestratorParts) -> Self {
        Self {
            config: parts.config,
            engine: parts.engine,
            http_client: parts.http_client,
            cache: parts.cache,
            artwork: parts.artwork,
            delegate: parts.delegate,
            event_bus: parts.event_bus,
            snapshot: parts.snapshot,
            internal_tx: parts.internal_tx,
            loader_tx: parts.loader_tx,
            network_task: parts.network_task,
            resource: None,
            generation: 0,
            preparing: None,
            pipeline: None,
            player_state: PlayerState::UrlNotSet,
            playback_state: PlaybackState::Stopped,
            connected: true,
            recovery: None,
            recovery_cycle: 0,
            metadata: None,
            artwork_url: None,
            artwork_seq: 0,
            artwork_task: None,
        }
    }

    /// Message loop. Returns after `Shutdown` or once every handle is gone.
    #[instrument(name = "player", skip_all)]
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        mut loader_events: mpsc::UnboundedReceiver<LoaderEvent>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        debug!("Player task started");

        loop {
            tokio::select! {
                biased;

                Some(message) = internal.recv() => self.on_internal(message),
                Some(event) = loader_events.recv() => self.on_loader_event(event),
                Some(event) = engine_events.recv() => self.on_engine_event(event),
                command = commands.recv() => match command {
                    Some(Command::Shutdown(done)) => {
                        commands.close();
                        self.teardown();
                        self.sync_snapshot();
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.on_command(command),
                    None => {
                        debug!("All player handles dropped");
                        self.teardown();
                        break;
                    }
                },
            }
            self.sync_snapshot();
        }

        if let Some(task) = self.network_task.take() {
            task.abort();
        }
        debug!("Player task stopped");
    }

    fn on_command(&mut self, command: Command) {
        trace!(?command, "Command");
        match command {
            Command::SetResource(resource) => self.set_resource(resource),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::Toggle => {
                if self.playback_state == PlaybackState::Playing {
                    self.pause();
                } else {
                    self.play();
                }
            }
            Command::Flush(done) => {
                self.sync_snapshot();
                let _ = done.send(());
            }
            // handled by the loop
            Command::Shutdown(_) => {}
        }
    }

    fn on_internal(&mut self, message: Internal) {
        match message {
            Internal::CacheLookup { generation, result } => {
                if generation == self.generation {
                    self.on_cache_lookup(result);
                } else {
                    trace!(generation, "Discarding stale cache lookup");
                }
            }
            Internal::Validation { generation, result } => {
                if generation == self.generation {
                    self.on_validation(result);
                } else {
                    trace!(generation, "Discarding stale validation");
                }
            }
            Internal::Artwork { seq, url } => {
                if seq == self.artwork_seq {
                    self.artwork_task = None;
                    self.set_artwork(url);
                } else {
                    trace!(seq, current = self.artwork_seq, "Discarding stale artwork");
                }
            }
            Internal::RecoveryTimer { cycle } => self.on_recovery_timer(cycle),
            Internal::Network(info) => self.on_network_change(info),
        }
    }

    // ------------------------------------------------------------------
    // Resource assignment
    // ------------------------------------------------------------------

    fn set_resource(&mut self, resource: Option<Resource>) {
        if resource == self.resource && self.player_state != PlayerState::Error {
            debug!("Resource unchanged");
            return;
        }

        self.teardown();
        self.generation += 1;

        if resource != self.resource {
            self.resource = resource;
            self.delegate.resource_changed(self.resource.as_ref());
        }

        let Some(resource) = self.resource.clone() else {
            info!("Resource cleared");
            self.set_player_state(PlayerState::UrlNotSet);
            return;
        };

        info!(
            generation = self.generation,
            live = resource.is_live(),
            url = %redact_url(resource.url()),
            "Resource assigned"
        );
        self.set_player_state(PlayerState::Loading);

        match (resource.cache_key(), self.cache.clone()) {
            (Some(key), Some(cache)) => self.spawn_cache_lookup(key.to_string(), cache),
            _ => self.spawn_validation(resource.url().to_string()),
        }
    }

    fn spawn_cache_lookup(&mut self, key: String, cache: Arc<dyn CacheStore>) {
        let generation = self.generation;
        let tx = self.internal_tx.clone();
        self.preparing = Some(tokio::spawn(async move {
            let result = cache.get(&key).await.map_err(PlaybackError::from);
            let _ = tx.send(Internal::CacheLookup { generation, result });
        }));
    }

    fn on_cache_lookup(&mut self, result: Result<Option<Bytes>>) {
        self.preparing = None;
        let Some(resource) = self.resource.clone() else {
            return;
        };

        match result {
            Ok(Some(bytes)) => {
                let content_type = self.content_type_for(&resource);
                info!(bytes = bytes.len(), %content_type, "Cache hit, playing from memory");
                let bridge = ResourceLoaderBridge::memory(
                    resource.url(),
                    bytes,
                    content_type.clone(),
                    Some(self.loader_tx.clone()),
                );
                self.attach(bridge, content_type);
            }
            Ok(None) => {
                debug!("Cache miss");
                self.spawn_validation(resource.url().to_string());
            }
            Err(e) => {
                warn!(error = %e, "Cache lookup failed, treating as miss");
                self.spawn_validation(resource.url().to_string());
            }
        }
    }

    fn spawn_validation(&mut self, url: String) {
        let generation = self.generation;
        let tx = self.internal_tx.clone();
        let engine = Arc::clone(&self.engine);
        let headers = self.config.http_headers.clone();
        self.preparing = Some(tokio::spawn(async move {
            let result = engine
                .probe_playable(&url, &headers)
                .await
                .map_err(PlaybackError::from);
            let _ = tx.send(Internal::Validation { generation, result });
        }));
    }

    fn on_validation(&mut self, result: Result<bool>) {
        self.preparing = None;
        let Some(resource) = self.resource.clone() else {
            return;
        };

        let reason = match result {
            Ok(true) => {
                let content_type = self.content_type_for(&resource);
                match ResourceLoaderBridge::network(
                    resource.url(),
                    Arc::clone(&self.http_client),
                    self.config.http_headers.clone(),
                    content_type.clone(),
                    Some(self.loader_tx.clone()),
                ) {
                    Ok(bridge) => {
                        self.emit_download(DownloadEvent::Started {
                            url: resource.url().to_string(),
                        });
                        self.attach(bridge, content_type);
                        return;
                    }
                    Err(e) => e.to_string(),
                }
            }
            Ok(false) => "engine cannot play this resource".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(%reason, url = %redact_url(resource.url()), "Resource is not playable");
        self.teardown();
        self.set_player_state(PlayerState::Error);
        self.report_error(PlaybackError::ResourceUnplayable(reason));
    }

    fn content_type_for(&self, resource: &Resource) -> String {
        resource
            .content_type_hint()
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_content_type.clone())
    }

    fn attach(&mut self, bridge: ResourceLoaderBridge, content_type: String) {
        debug!(bridge = %bridge.id(), in_memory = bridge.is_in_memory(), "Attaching pipeline");
        self.pipeline = Some(Pipeline {
            bridge,
            content_type,
            item: None,
            deferred_ready: None,
        });
        self.attach_item();

        if self.config.auto_play {
            self.play();
        }
    }

    /// Hand the engine a fresh item reading from the current bridge.
    fn attach_item(&mut self) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };

        let source: Arc<dyn DataSource> = Arc::new(pipeline.bridge.clone());
        let item = EngineItem::new(
            source,
            pipeline.bridge.url(),
            pipeline.content_type.clone(),
        );
        debug!(item = ?item.id, bridge = %pipeline.bridge.id(), "Replacing engine item");
        pipeline.item = Some(item.id);
        pipeline.deferred_ready = None;
        self.engine.replace_current_item(Some(item));
    }

    /// Drop the pipeline and everything in flight for it. Keeps the
    /// resource identity.
    fn teardown(&mut self) {
        if let Some(task) = self.preparing.take() {
            task.abort();
        }
        self.cancel_recovery();

        if let Some(pipeline) = self.pipeline.take() {
            debug!(bridge = %pipeline.bridge.id(), "Tearing down pipeline");
            if pipeline.item.is_some() {
                self.engine.replace_current_item(None);
            }
            pipeline.bridge.shutdown();
        }

        self.set_playback_state(PlaybackState::Stopped);
        self.set_metadata(None);
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    fn play(&mut self) {
        let Some(pipeline) = &self.pipeline else {
            debug!("Play ignored, nothing attached");
            return;
        };
        if pipeline.item.is_none() {
            if pipeline.bridge.is_shut_down() && !self.reopen_bridge() {
                return;
            }
            self.attach_item();
        }
        self.engine.play();
        self.set_playback_state(PlaybackState::Playing);
    }

    fn pause(&mut self) {
        if self.pipeline.is_none() {
            debug!("Pause ignored, nothing attached");
            return;
        }
        self.engine.pause();
        self.set_playback_state(PlaybackState::Paused);
    }

    /// Detach the engine item. A live feed also drops its download, so the
    /// next `play()` joins the stream where it is now.
    fn stop(&mut self) {
        let live = self.resource.as_ref().is_some_and(Resource::is_live);
        let Some(pipeline) = self.pipeline.as_mut() else {
            debug!("Stop ignored, nothing attached");
            return;
        };
        if pipeline.item.take().is_some() {
            pipeline.deferred_ready = None;
            self.engine.replace_current_item(None);
        }
        if live {
            pipeline.bridge.shutdown();
        }
        self.cancel_recovery();
        self.set_metadata(None);
        self.set_playback_state(PlaybackState::Stopped);
    }

    /// Replace a shut-down live bridge with a fresh network one.
    fn reopen_bridge(&mut self) -> bool {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return false;
        };
        let url = pipeline.bridge.url().to_string();
        match ResourceLoaderBridge::network(
            &url,
            Arc::clone(&self.http_client),
            self.config.http_headers.clone(),
            pipeline.content_type.clone(),
            Some(self.loader_tx.clone()),
        ) {
            Ok(bridge) => {
                debug!(old = %pipeline.bridge.id(), new = %bridge.id(), "Reopening live stream");
                pipeline.bridge = bridge;
                self.emit_download(DownloadEvent::Started { url });
                true
            }
            Err(e) => {
                self.report_error(PlaybackError::FetchFailed(e.to_string()));
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    fn set_player_state(&mut self, state: PlayerState) {
        if transition(&mut self.player_state, state) {
            debug!(%state, "Player state changed");
            self.delegate.player_state_changed(state);
        }
    }

    fn set_playback_state(&mut self, state: PlaybackState) {
        let previous = self.playback_state;
        if !transition(&mut self.playback_state, state) {
            return;
        }

        debug!(%state, %previous, "Playback state changed");
        self.delegate.playback_state_changed(state);
        if state == PlaybackState::Playing {
            self.delegate.audio_output_changed(AudioOutputClaim::Acquire);
        } else if previous == PlaybackState::Playing {
            self.delegate.audio_output_changed(AudioOutputClaim::Release);
        }
    }

    /// Report a ready state, unless the bridge cannot yet answer the first
    /// range the engine asked for. Then it is applied on `FirstRangeSatisfied`.
    fn set_ready(&mut self, state: PlayerState) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };

        if pipeline.bridge.first_range_satisfied() {
            pipeline.deferred_ready = None;
            self.set_player_state(state);
        } else {
            trace!(%state, "Deferring ready state until first range is buffered");
            pipeline.deferred_ready = Some(state);
        }
    }

    fn set_loading(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.deferred_ready = None;
        }
        self.set_player_state(PlayerState::Loading);
    }

    fn sync_snapshot(&self) {
        let mut snapshot = self.snapshot.write();
        snapshot.player_state = self.player_state;
        snapshot.playback_state = self.playback_state;
        if snapshot.resource != self.resource {
            snapshot.resource = self.resource.clone();
        }
        if snapshot.metadata != self.metadata {
            snapshot.metadata = self.metadata.clone();
        }
        if snapshot.artwork_url != self.artwork_url {
            snapshot.artwork_url = self.artwork_url.clone();
        }
    }

    fn report_error(&self, error: PlaybackError) {
        warn!(error = %error, transient = error.is_transient(), "Player error");
        self.delegate.player_error(&error);
    }

    fn emit_download(&self, event: DownloadEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Download(event));
        }
    }

    // ------------------------------------------------------------------
    // Engine & loader events
    // ------------------------------------------------------------------

    fn on_engine_event(&mut self, event: EngineEvent) {
        let current = self.pipeline.as_ref().and_then(|p| p.item);
        if current != Some(event.item) {
            trace!(item = ?event.item, "Ignoring event for stale engine item");
            return;
        }

        trace!(kind = ?event.kind, "Engine event");
        match event.kind {
            EngineEventKind::Ready => self.set_ready(PlayerState::ReadyToPlay),
            EngineEventKind::Failed(reason) => {
                warn!(%reason, "Engine item failed");
                self.teardown();
                self.set_player_state(PlayerState::Error);
                self.report_error(PlaybackError::EngineError(reason));
            }
            EngineEventKind::BufferEmpty => self.set_loading(),
            EngineEventKind::LikelyToKeepUp(true) => self.set_ready(PlayerState::LoadingFinished),
            EngineEventKind::LikelyToKeepUp(false) => {
                self.set_loading();
                self.check_stall("not likely to keep up");
            }
            EngineEventKind::PlaybackStalled => self.check_stall("playback stalled"),
            EngineEventKind::TimedMetadata(raw) => {
                self.set_metadata(raw.map(StreamMetadata::parse));
            }
            EngineEventKind::PlayedToEnd => {
                debug!("Played to end");
                self.stop();
            }
        }
    }

    fn on_loader_event(&mut self, event: LoaderEvent) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return;
        };
        if pipeline.bridge.id() != event.bridge {
            trace!(bridge = %event.bridge, "Ignoring event from stale bridge");
            return;
        }
        let url = pipeline.bridge.url().to_string();

        match event.kind {
            LoaderEventKind::ResponseReceived {
                content_type,
                content_length,
            } => {
                let content_type = content_type.unwrap_or_else(|| pipeline.content_type.clone());
                self.emit_download(DownloadEvent::ResponseReceived {
                    url,
                    content_type,
                    content_length,
                });
            }
            LoaderEventKind::FirstRangeSatisfied => {
                if let Some(state) = pipeline.deferred_ready.take() {
                    if pipeline.item.is_some() {
                        self.set_player_state(state);
                    }
                }
            }
            LoaderEventKind::DownloadCompleted(bytes) => {
                self.emit_download(DownloadEvent::Completed {
                    url,
                    bytes: bytes.len() as u64,
                });
                self.store_completed(bytes);
            }
            LoaderEventKind::DownloadFailed(message) => {
                self.emit_download(DownloadEvent::Failed {
                    url,
                    message: message.clone(),
                });
                self.report_error(PlaybackError::FetchFailed(message));
            }
        }
    }

    /// Write a fully downloaded static asset back to the cache.
    fn store_completed(&self, bytes: Bytes) {
        if !self.config.cache_completed_assets {
            return;
        }
        let (Some(cache), Some(key)) = (
            self.cache.clone(),
            self.resource.as_ref().and_then(Resource::cache_key),
        ) else {
            return;
        };

        let key = key.to_string();
        tokio::spawn(async move {
            let size = bytes.len();
            match cache.put(&key, bytes).await {
                Ok(()) => debug!(size, "Stored completed asset"),
                Err(e) => warn!(error = %e, "Failed to store completed asset"),
            }
        });
    }

    // ------------------------------------------------------------------
    // Stall recovery
    // ------------------------------------------------------------------

    /// Start a recovery cycle if playback is stalled while online.
    ///
    /// Triggers arriving while a cycle is outstanding are ignored, so
    /// flapping connectivity reloads the item at most once per cycle.
    fn check_stall(&mut self, reason: &'static str) {
        if self.recovery.is_some() {
            trace!(reason, "Recovery already in progress");
            return;
        }
        if !self.pipeline.as_ref().is_some_and(|p| p.item.is_some()) {
            return;
        }
        if !self.connected {
            debug!(reason, "Stalled while offline, waiting for connectivity");
            return;
        }
        if self.engine.is_playback_likely_to_keep_up() {
            return;
        }

        self.recovery_cycle += 1;
        let cycle = self.recovery_cycle;
        let grace = self.config.recovery_grace_period();
        info!(reason, cycle, grace_ms = grace.as_millis() as u64, "Stall detected, pausing for recovery");

        self.engine.pause();
        let tx = self.internal_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(Internal::RecoveryTimer { cycle });
        });
        self.recovery = Some(Recovery { cycle, timer });
    }

    fn on_recovery_timer(&mut self, cycle: u64) {
        if !self.recovery.as_ref().is_some_and(|r| r.cycle == cycle) {
            trace!(cycle, "Discarding stale recovery timer");
            return;
        }
        self.recovery = None;
        if self.pipeline.is_none() {
            return;
        }

        if !self.engine.is_playback_likely_to_keep_up() {
            info!(cycle, "Still stalled, reloading engine item");
            self.report_error(PlaybackError::StallNotRecovered);
            self.attach_item();
        }

        if self.playback_state == PlaybackState::Playing {
            debug!(cycle, "Resuming after recovery");
            self.engine.play();
        } else {
            self.engine.pause();
        }
    }

    fn cancel_recovery(&mut self) {
        if let Some(recovery) = self.recovery.take() {
            trace!(cycle = recovery.cycle, "Cancelling recovery");
            recovery.timer.abort();
        }
    }

    fn on_network_change(&mut self, info: NetworkInfo) {
        let was_connected = self.connected;
        self.connected = info.is_connected();
        if was_connected == self.connected {
            return;
        }

        info!(connected = self.connected, "Connectivity changed");
        if self.connected {
            self.check_stall("connectivity restored");
        }
    }

    // ------------------------------------------------------------------
    // Metadata & artwork
    // ------------------------------------------------------------------

    fn set_metadata(&mut self, metadata: Option<StreamMetadata>) {
        if !transition(&mut self.metadata, metadata) {
            return;
        }

        debug!(raw = ?self.metadata.as_ref().map(|m| &m.raw), "Stream metadata changed");
        self.delegate.metadata_changed(self.metadata.as_ref());
        self.start_artwork_lookup();
    }

    /// Supersede any running lookup with one for the current metadata.
    fn start_artwork_lookup(&mut self) {
        self.artwork_seq += 1;
        if let Some(task) = self.artwork_task.take() {
            task.abort();
        }

        let query = match &self.metadata {
            Some(metadata) if !metadata.is_blank() => metadata.search_term(),
            _ => {
                self.set_artwork(None);
                return;
            }
        };
        let Some(lookup) = self.artwork.clone().filter(|_| self.config.enable_artwork) else {
            return;
        };

        let seq = self.artwork_seq;
        let size = self.config.artwork_size;
        let tx = self.internal_tx.clone();
        self.artwork_task = Some(tokio::spawn(async move {
            let url = match lookup.lookup(&query, size).await {
                Ok(url) => url,
                Err(e) => {
                    debug!(error = %e, "Artwork lookup failed");
                    None
                }
            };
            let _ = tx.send(Internal::Artwork { seq, url });
        }));
    }

    fn set_artwork(&mut self, url: Option<String>) {
        if transition(&mut self.artwork_url, url) {
            debug!(url = ?self.artwork_url, "Artwork changed");
            self.delegate.artwork_changed(self.artwork_url.as_deref());
        }
    }
}

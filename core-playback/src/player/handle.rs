use super::delegate::{NoopDelegate, PlayerDelegate};
use super::orchestrator::{Command, Internal, Orchestrator, OrchestratorParts, PlayerSnapshot};
use super::state::{PlaybackState, PlayerState};
use crate::config::PlayerConfig;
use crate::error::{PlaybackError, Result};
use crate::resource::Resource;
use bridge_traits::http::HttpClient;
use bridge_traits::network::NetworkMonitor;
use bridge_traits::{CacheStore, EngineEventSink, PlaybackEngine};
use core_metadata::{ArtworkLookup, StreamMetadata};
use core_runtime::events::EventBus;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Handle to a running player.
///
/// Commands are queued to the player task and applied in order. Getters
/// read the state as of the last handled message; await [`flush`] to make
/// sure earlier commands have been applied.
///
/// Dropping every handle stops the player.
///
/// [`flush`]: RadioPlayer::flush
pub struct RadioPlayer {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: Arc<RwLock<PlayerSnapshot>>,
    engine: Arc<dyn PlaybackEngine>,
}

impl RadioPlayer {
    pub fn builder(
        engine: Arc<dyn PlaybackEngine>,
        http_client: Arc<dyn HttpClient>,
    ) -> RadioPlayerBuilder {
        RadioPlayerBuilder::new(engine, http_client)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::PlayerShutDown)
    }

    /// Assign the resource to play, or clear it with `None`.
    pub fn set_resource(&self, resource: Option<Resource>) -> Result<()> {
        self.send(Command::SetResource(resource))
    }

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Pause when playing, play otherwise.
    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    pub fn player_state(&self) -> PlayerState {
        self.snapshot.read().player_state
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.snapshot.read().playback_state
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state() == PlaybackState::Playing
    }

    /// Engine playback rate, `0.0` when not advancing.
    pub fn rate(&self) -> f32 {
        self.engine.rate()
    }

    pub fn resource(&self) -> Option<Resource> {
        self.snapshot.read().resource.clone()
    }

    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.snapshot.read().metadata.clone()
    }

    pub fn artwork_url(&self) -> Option<String> {
        self.snapshot.read().artwork_url.clone()
    }

    /// Wait until every command sent before this call has been handled.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Flush(tx))?;
        rx.await.map_err(|_| PlaybackError::PlayerShutDown)
    }

    /// Tear down the pipeline and stop the player task.
    ///
    /// Later commands fail with [`PlaybackError::PlayerShutDown`].
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx))?;
        rx.await.map_err(|_| PlaybackError::PlayerShutDown)?;
        info!("Player shut down");
        Ok(())
    }
}

impl fmt::Debug for RadioPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot.read();
        f.debug_struct("RadioPlayer")
            .field("player_state", &snapshot.player_state)
            .field("playback_state", &snapshot.playback_state)
            .field("resource", &snapshot.resource)
            .finish_non_exhaustive()
    }
}

/// Builder wiring the player's collaborators.
///
/// Only the engine and the HTTP client are required. Without a cache store
/// every static asset is fetched; without an artwork lookup artwork stays
/// unset; without a network monitor the network is assumed reachable.
pub struct RadioPlayerBuilder {
    engine: Arc<dyn PlaybackEngine>,
    http_client: Arc<dyn HttpClient>,
    config: PlayerConfig,
    cache: Option<Arc<dyn CacheStore>>,
    artwork: Option<Arc<dyn ArtworkLookup>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    delegate: Arc<dyn PlayerDelegate>,
    event_bus: Option<EventBus>,
}

impl RadioPlayerBuilder {
    pub fn new(engine: Arc<dyn PlaybackEngine>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            engine,
            http_client,
            config: PlayerConfig::default(),
            cache: None,
            artwork: None,
            network_monitor: None,
            delegate: Arc::new(NoopDelegate),
            event_bus: None,
        }
    }

    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache_store(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn artwork_lookup(mut self, lookup: Arc<dyn ArtworkLookup>) -> Self {
        self.artwork = Some(lookup);
        self
    }

    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    pub fn delegate(mut self, delegate: Arc<dyn PlayerDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Bus receiving download lifecycle events.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Validate the configuration and start the player task on the current
    /// tokio runtime.
    pub fn spawn(self) -> Result<RadioPlayer> {
        self.config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|_| PlaybackError::Internal("player requires a tokio runtime".to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (loader_tx, loader_rx) = mpsc::unbounded_channel();
        let (sink, engine_rx) = EngineEventSink::channel();
        self.engine.set_event_sink(sink);

        let network_task = self
            .network_monitor
            .map(|monitor| watch_network(&runtime, monitor, internal_tx.clone()));

        let snapshot = Arc::new(RwLock::new(PlayerSnapshot::default()));
        let orchestrator = Orchestrator::new(OrchestratorParts {
            config: self.config,
            engine: Arc::clone(&self.engine),
            http_client: self.http_client,
            cache: self.cache,
            artwork: self.artwork,
            delegate: self.delegate,
            event_bus: self.event_bus,
            snapshot: Arc::clone(&snapshot),
            internal_tx,
            loader_tx,
            network_task,
        });

        runtime.spawn(orchestrator.run(command_rx, engine_rx, loader_rx, internal_rx));
        debug!("Player spawned");

        Ok(RadioPlayer {
            commands: command_tx,
            snapshot,
            engine: self.engine,
        })
    }
}

/// Forward connectivity changes to the player task.
fn watch_network(
    runtime: &Handle,
    monitor: Arc<dyn NetworkMonitor>,
    tx: mpsc::UnboundedSender<Internal>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut changes = match monitor.subscribe_changes().await {
            Ok(changes) => changes,
            Err(e) => {
                warn!(error = %e, "Network monitoring unavailable");
                return;
            }
        };
        while let Some(info) = changes.next().await {
            if tx.send(Internal::Network(info)).is_err() {
                break;
            }
        }
        debug!("Network change stream ended");
    })
}

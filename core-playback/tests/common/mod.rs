//! Fakes shared by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, StreamingResponse};
use bridge_traits::network::{NetworkChangeStream, NetworkInfo, NetworkMonitor};
use bridge_traits::{
    BridgeError, EngineEvent, EngineEventKind, EngineEventSink, EngineItem, EngineItemId,
    PendingRequest, PlaybackEngine, RangeReceiver,
};
use bytes::Bytes;
use core_metadata::StreamMetadata;
use core_playback::{
    AudioOutputClaim, PlaybackError, PlaybackState, PlayerDelegate, PlayerState, RadioPlayer,
    Resource,
};
use futures::channel::mpsc as fmpsc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Streaming HTTP
// ============================================================================

/// HTTP client whose streaming bodies are fed by the test.
pub struct StreamingHttp {
    content_type: Option<String>,
    content_length: Option<u64>,
    opened: AtomicUsize,
    feeds: Mutex<Vec<fmpsc::UnboundedSender<BridgeResult<Bytes>>>>,
    last_request: Mutex<Option<HttpRequest>>,
}

impl StreamingHttp {
    pub fn new(content_type: Option<&str>, content_length: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            content_type: content_type.map(str::to_string),
            content_length,
            opened: AtomicUsize::new(0),
            feeds: Mutex::new(Vec::new()),
            last_request: Mutex::new(None),
        })
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.last_request.lock().clone()
    }

    /// Push a chunk into the most recently opened body.
    pub fn push(&self, chunk: &[u8]) {
        if let Some(feed) = self.feeds.lock().last() {
            let _ = feed.unbounded_send(Ok(Bytes::copy_from_slice(chunk)));
        }
    }

    pub fn fail(&self, message: &str) {
        if let Some(feed) = self.feeds.lock().last() {
            let _ = feed.unbounded_send(Err(BridgeError::OperationFailed(message.to_string())));
        }
    }

    /// End every open body.
    pub fn finish(&self) {
        self.feeds.lock().clear();
    }
}

#[async_trait]
impl HttpClient for StreamingHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::NotAvailable("buffered requests".to_string()))
    }

    async fn open_stream(&self, request: HttpRequest) -> BridgeResult<StreamingResponse> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request);

        let (tx, rx) = fmpsc::unbounded();
        self.feeds.lock().push(tx);
        Ok(StreamingResponse {
            status: 200,
            content_type: self.content_type.clone(),
            content_length: self.content_length,
            body: Box::pin(rx),
        })
    }
}

// ============================================================================
// Playback engine
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Replace(Option<EngineItemId>),
    Play,
    Pause,
}

/// Engine recording every call, with a settable keep-up prediction.
pub struct FakeEngine {
    sink: Mutex<Option<EngineEventSink>>,
    current: Mutex<Option<EngineItem>>,
    calls: Mutex<Vec<EngineCall>>,
    keep_up: AtomicBool,
    playable: AtomicBool,
    probes: AtomicUsize,
    rate: Mutex<f32>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sink: Mutex::new(None),
            current: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            keep_up: AtomicBool::new(true),
            playable: AtomicBool::new(true),
            probes: AtomicUsize::new(0),
            rate: Mutex::new(0.0),
        })
    }

    pub fn set_keep_up(&self, keep_up: bool) {
        self.keep_up.store(keep_up, Ordering::SeqCst);
    }

    pub fn set_playable(&self, playable: bool) {
        self.playable.store(playable, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn current_item(&self) -> Option<EngineItem> {
        self.current.lock().clone()
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn replace_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, EngineCall::Replace(Some(_))))
            .count()
    }

    /// Emit an event for the current item.
    pub fn emit(&self, kind: EngineEventKind) {
        let item = self
            .current_item()
            .map(|item| item.id)
            .expect("no current item");
        self.emit_for(item, kind);
    }

    pub fn emit_for(&self, item: EngineItemId, kind: EngineEventKind) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.emit(EngineEvent::new(item, kind));
        }
    }

    /// Issue a range read against the current item's source.
    pub fn request(&self, offset: u64, length: u64) -> RangeReceiver {
        let item = self.current_item().expect("no current item");
        let (request, rx) = PendingRequest::new(offset, length);
        item.source.submit(request);
        rx
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    fn set_event_sink(&self, sink: EngineEventSink) {
        *self.sink.lock() = Some(sink);
    }

    fn replace_current_item(&self, item: Option<EngineItem>) {
        self.calls
            .lock()
            .push(EngineCall::Replace(item.as_ref().map(|item| item.id)));
        *self.current.lock() = item;
        *self.rate.lock() = 0.0;
    }

    fn play(&self) {
        self.calls.lock().push(EngineCall::Play);
        *self.rate.lock() = 1.0;
    }

    fn pause(&self) {
        self.calls.lock().push(EngineCall::Pause);
        *self.rate.lock() = 0.0;
    }

    fn rate(&self) -> f32 {
        *self.rate.lock()
    }

    fn is_playback_likely_to_keep_up(&self) -> bool {
        self.keep_up.load(Ordering::SeqCst)
    }

    async fn probe_playable(
        &self,
        _url: &str,
        _headers: &HashMap<String, String>,
    ) -> BridgeResult<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.playable.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Delegate
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Player(PlayerState),
    Playback(PlaybackState),
    Resource(Option<Resource>),
    Metadata(Option<String>),
    Artwork(Option<String>),
    Output(AudioOutputClaim),
    Error(String),
}

#[derive(Default)]
pub struct RecordingDelegate {
    log: Mutex<Vec<Notification>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn player_states(&self) -> Vec<PlayerState> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Player(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn playback_states(&self) -> Vec<PlaybackState> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Playback(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn artworks(&self) -> Vec<Option<String>> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Artwork(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) {
        self.log.lock().push(notification);
    }
}

impl PlayerDelegate for RecordingDelegate {
    fn player_state_changed(&self, state: PlayerState) {
        self.record(Notification::Player(state));
    }

    fn playback_state_changed(&self, state: PlaybackState) {
        self.record(Notification::Playback(state));
    }

    fn resource_changed(&self, resource: Option<&Resource>) {
        self.record(Notification::Resource(resource.cloned()));
    }

    fn metadata_changed(&self, metadata: Option<&StreamMetadata>) {
        self.record(Notification::Metadata(metadata.map(|m| m.raw.clone())));
    }

    fn artwork_changed(&self, url: Option<&str>) {
        self.record(Notification::Artwork(url.map(str::to_string)));
    }

    fn audio_output_changed(&self, claim: AudioOutputClaim) {
        self.record(Notification::Output(claim));
    }

    fn player_error(&self, error: &PlaybackError) {
        self.record(Notification::Error(error.to_string()));
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Let spawned work report back, then wait for the player to handle it.
pub async fn settle(player: &RadioPlayer) {
    for _ in 0..3 {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        player.flush().await.unwrap();
    }
}

/// Like [`settle`], for tests running on paused time.
pub async fn settle_paused(player: &RadioPlayer) {
    tokio::time::sleep(Duration::from_millis(1)).await;
    settle(player).await;
}

// ============================================================================
// Network monitor
// ============================================================================

/// Monitor whose change stream is fed by the test.
pub struct FakeNetworkMonitor {
    changes: Mutex<Option<tokio::sync::mpsc::UnboundedReceiver<NetworkInfo>>>,
}

impl FakeNetworkMonitor {
    pub fn new() -> (Arc<Self>, tokio::sync::mpsc::UnboundedSender<NetworkInfo>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (
            Arc::new(Self {
                changes: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

struct ChannelChanges(tokio::sync::mpsc::UnboundedReceiver<NetworkInfo>);

#[async_trait]
impl NetworkChangeStream for ChannelChanges {
    async fn next(&mut self) -> Option<NetworkInfo> {
        self.0.recv().await
    }
}

#[async_trait]
impl NetworkMonitor for FakeNetworkMonitor {
    async fn get_network_info(&self) -> BridgeResult<NetworkInfo> {
        Ok(NetworkInfo::connected(None))
    }

    async fn subscribe_changes(&self) -> BridgeResult<Box<dyn NetworkChangeStream>> {
        let rx = self
            .changes
            .lock()
            .take()
            .ok_or_else(|| BridgeError::NotAvailable("already subscribed".to_string()))?;
        Ok(Box::new(ChannelChanges(rx)))
    }
}

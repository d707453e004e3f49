//! Playback engine bridge traits.
//!
//! The decode/render engine is owned by the host. The core talks to it
//! through two contracts:
//!
//! - [`DataSource`]: the engine pulls byte ranges from a source the core
//!   provides, instead of opening URLs itself.
//! - [`PlaybackEngine`]: transport control plus a typed event stream
//!   ([`EngineEvent`]) describing readiness, buffering and metadata.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;

// ============================================================================
// Range requests
// ============================================================================

/// Unique identifier of a byte-range read issued by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content information of a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    /// MIME type, e.g. `audio/mpeg`
    pub content_type: String,
    /// Total length in bytes, when declared
    pub content_length: Option<u64>,
    /// Whether arbitrary byte ranges may be requested
    pub byte_range_access: bool,
}

/// Message delivered to the engine for one pending request.
///
/// A request receives at most one `ContentInfo`, any number of contiguous
/// `Data` slices, and ends with exactly one of `Finished`, `Failed` or
/// `Cancelled`.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeResponse {
    ContentInfo(ContentInfo),
    Data { offset: u64, bytes: Bytes },
    Finished,
    Failed(String),
    Cancelled,
}

impl RangeResponse {
    /// Whether no further message follows this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RangeResponse::Finished | RangeResponse::Failed(_) | RangeResponse::Cancelled
        )
    }
}

/// A byte-range read issued by the engine against a [`DataSource`].
#[derive(Debug)]
pub struct PendingRequest {
    pub id: RequestId,
    pub requested_offset: u64,
    pub requested_length: u64,
    /// Offset of the next byte to deliver
    pub current_offset: u64,
    content_info_sent: bool,
    responder: mpsc::UnboundedSender<RangeResponse>,
}

impl PendingRequest {
    /// Create a request for `length` bytes starting at `offset`, along with
    /// the receiver the engine reads responses from.
    pub fn new(offset: u64, length: u64) -> (Self, RangeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let request = Self {
            id: RequestId::new(),
            requested_offset: offset,
            requested_length: length,
            current_offset: offset,
            content_info_sent: false,
            responder: tx,
        };
        (request, RangeReceiver { rx })
    }

    /// Exclusive end of the requested range.
    pub fn requested_end(&self) -> u64 {
        self.requested_offset.saturating_add(self.requested_length)
    }

    /// Fill in content information, once per request.
    pub fn respond_content_info(&mut self, info: &ContentInfo) {
        if self.content_info_sent {
            return;
        }
        self.content_info_sent = true;
        let _ = self
            .responder
            .send(RangeResponse::ContentInfo(info.clone()));
    }

    /// Deliver `bytes` at the current offset and advance it.
    pub fn respond_data(&mut self, bytes: Bytes) {
        let offset = self.current_offset;
        self.current_offset += bytes.len() as u64;
        let _ = self.responder.send(RangeResponse::Data { offset, bytes });
    }

    pub fn finish(self) {
        let _ = self.responder.send(RangeResponse::Finished);
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.responder.send(RangeResponse::Failed(reason.into()));
    }

    pub fn cancel(self) {
        let _ = self.responder.send(RangeResponse::Cancelled);
    }

    /// Whether the engine has dropped its receiver.
    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }
}

/// Engine side of a [`PendingRequest`].
#[derive(Debug)]
pub struct RangeReceiver {
    rx: mpsc::UnboundedReceiver<RangeResponse>,
}

impl RangeReceiver {
    pub async fn recv(&mut self) -> Option<RangeResponse> {
        self.rx.recv().await
    }

    /// Non-blocking poll; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<RangeResponse> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued so far.
    pub fn drain(&mut self) -> Vec<RangeResponse> {
        let mut out = Vec::new();
        while let Some(response) = self.try_recv() {
            out.push(response);
        }
        out
    }
}

/// Seekable byte source the engine reads from.
///
/// Calls never block; responses are delivered through the request's
/// channel as data becomes available.
pub trait DataSource: Send + Sync {
    /// Content information, if known yet.
    fn content_info(&self) -> Option<ContentInfo>;

    /// Register a range read. The request is eventually finished, failed or
    /// cancelled.
    fn submit(&self, request: PendingRequest);

    /// Withdraw a range read. Unknown ids are ignored.
    fn cancel(&self, id: RequestId);
}

// ============================================================================
// Engine items & events
// ============================================================================

/// Identifier of an item handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineItemId(Uuid);

impl EngineItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Playable item: a data source plus what the engine needs to know about it.
#[derive(Clone)]
pub struct EngineItem {
    pub id: EngineItemId,
    pub source: Arc<dyn DataSource>,
    /// Resource URL, informational only
    pub url: String,
    pub content_type: String,
}

impl EngineItem {
    pub fn new(
        source: Arc<dyn DataSource>,
        url: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: EngineItemId::new(),
            source,
            url: url.into(),
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for EngineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineItem")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// What happened to an engine item.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    /// Item can start playing
    Ready,
    /// Item failed and cannot play
    Failed(String),
    /// Playback buffer ran dry
    BufferEmpty,
    /// Prediction of uninterrupted playback changed
    LikelyToKeepUp(bool),
    /// Inline stream metadata changed; `None` when cleared
    TimedMetadata(Option<String>),
    PlaybackStalled,
    PlayedToEnd,
}

/// Event emitted by the engine for one of its items.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub item: EngineItemId,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn new(item: EngineItemId, kind: EngineEventKind) -> Self {
        Self { item, kind }
    }
}

/// Where the engine publishes its events.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publish an event. Returns `false` once the listener is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Host playback engine.
///
/// Timing, decoding and audio routing belong to the engine. Transport calls
/// are synchronous and must not block; the engine reports progress through
/// the sink installed with [`set_event_sink`](Self::set_event_sink).
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Install the sink receiving events for every item.
    fn set_event_sink(&self, sink: EngineEventSink);

    /// Replace the current item; `None` detaches it.
    fn replace_current_item(&self, item: Option<EngineItem>);

    fn play(&self);

    fn pause(&self);

    /// Current playback rate, `0.0` when not advancing.
    fn rate(&self) -> f32;

    fn is_playback_likely_to_keep_up(&self) -> bool;

    /// Capability probe: whether the remote source at `url` looks playable.
    /// This must not download the whole resource.
    async fn probe_playable(&self, url: &str, headers: &HashMap<String, String>) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_request_tracks_offset() {
        let (mut request, mut rx) = PendingRequest::new(100, 50);
        assert_eq!(request.requested_end(), 150);

        request.respond_data(Bytes::from_static(b"0123456789"));
        assert_eq!(request.current_offset, 110);
        request.finish();

        let responses = rx.drain();
        assert_eq!(
            responses,
            vec![
                RangeResponse::Data {
                    offset: 100,
                    bytes: Bytes::from_static(b"0123456789")
                },
                RangeResponse::Finished
            ]
        );
        assert!(responses[1].is_terminal());
    }

    #[test]
    fn content_info_is_sent_once() {
        let (mut request, mut rx) = PendingRequest::new(0, 10);
        let info = ContentInfo {
            content_type: "audio/mpeg".to_string(),
            content_length: Some(10),
            byte_range_access: true,
        };
        request.respond_content_info(&info);
        request.respond_content_info(&info);

        assert_eq!(rx.drain(), vec![RangeResponse::ContentInfo(info)]);
    }

    #[test]
    fn abandoned_when_receiver_dropped() {
        let (request, rx) = PendingRequest::new(0, 1);
        assert!(!request.is_abandoned());
        drop(rx);
        assert!(request.is_abandoned());
    }

    #[test]
    fn event_sink_reports_closed_listener() {
        let (sink, rx) = EngineEventSink::channel();
        let item = EngineItemId::new();
        assert!(sink.emit(EngineEvent::new(item, EngineEventKind::Ready)));
        drop(rx);
        assert!(!sink.emit(EngineEvent::new(item, EngineEventKind::PlayedToEnd)));
    }
}

//! # Resource Loader Bridge
//!
//! Serves the engine's pull-based range reads from a push-based byte
//! source: either a single progressive HTTP download or bytes already held
//! in memory.
//!
//! ## Fulfillment
//!
//! Every time the buffer grows (and on every submit) each pending request
//! is evaluated:
//!
//! 1. Content information is filled in once it is known.
//! 2. If bytes beyond the request's `current_offset` are buffered, the
//!    slice up to `min(buffered, requested_end)` is delivered and the
//!    offset advances. Successive slices are therefore contiguous.
//! 3. The request is finished and dropped once
//!    `buffered >= requested_offset + requested_length`.
//!
//! After a successful download, requests reaching past the end of the
//! resource are finished with whatever was available. After a failed
//! download, requests the buffer cannot satisfy are failed.
//!
//! ## Concurrency
//!
//! One `parking_lot::Mutex` guards the buffer, the pending set and the
//! fetch state. The fetch task and engine-side `submit`/`cancel` serialize
//! on it. Responses are sent over unbounded channels, so nothing blocks
//! while the lock is held.

use super::buffer::DownloadBuffer;
use super::fetch::FetchSession;
use crate::error::{PlaybackError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::{ContentInfo, DataSource, PendingRequest, RequestId};
use bytes::Bytes;
use core_runtime::logging::redact_url;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

static NEXT_BRIDGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one bridge instance, used to discard events from a bridge
/// that has since been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BridgeId(u64);

impl BridgeId {
    fn next() -> Self {
        Self(NEXT_BRIDGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bridge-{}", self.0)
    }
}

/// Signals raised by a bridge for whoever owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEventKind {
    /// Response head recorded.
    ResponseReceived {
        content_type: Option<String>,
        content_length: Option<u64>,
    },
    /// Enough bytes are buffered to answer the first range ever requested.
    FirstRangeSatisfied,
    /// Download finished; carries the complete resource.
    DownloadCompleted(Bytes),
    /// Download failed; raised once.
    DownloadFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderEvent {
    pub bridge: BridgeId,
    pub kind: LoaderEventKind,
}

pub type LoaderEventSender = mpsc::UnboundedSender<LoaderEvent>;

/// Observable state of the single fetch behind a bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    NotStarted,
    InFlight,
    Completed,
    Failed(String),
    Cancelled,
}

enum FetchState {
    NotStarted,
    InFlight(FetchSession),
    Completed,
    Failed(String),
    Cancelled,
}

impl FetchState {
    fn status(&self) -> FetchStatus {
        match self {
            FetchState::NotStarted => FetchStatus::NotStarted,
            FetchState::InFlight(_) => FetchStatus::InFlight,
            FetchState::Completed => FetchStatus::Completed,
            FetchState::Failed(reason) => FetchStatus::Failed(reason.clone()),
            FetchState::Cancelled => FetchStatus::Cancelled,
        }
    }
}

struct NetworkOrigin {
    http_client: Arc<dyn HttpClient>,
    headers: HashMap<String, String>,
    runtime: Handle,
}

struct LoaderState {
    buffer: DownloadBuffer,
    pending: Vec<PendingRequest>,
    fetch: FetchState,
    /// `(offset, end)` of the first request ever submitted
    first_range: Option<(u64, u64)>,
    first_range_satisfied: bool,
    shut_down: bool,
}

pub(crate) struct Inner {
    id: BridgeId,
    url: String,
    network: Option<NetworkOrigin>,
    fallback_content_type: String,
    state: Mutex<LoaderState>,
    events: Option<LoaderEventSender>,
    cancel: CancellationToken,
}

impl Inner {
    fn emit(&self, kind: LoaderEventKind) {
        if let Some(events) = &self.events {
            let _ = events.send(LoaderEvent {
                bridge: self.id,
                kind,
            });
        }
    }

    /// Fetch callback: response head arrived.
    pub(crate) fn on_response_metadata(&self, content_type: Option<String>, content_length: Option<u64>) {
        let mut state = self.state.lock();
        if state.shut_down {
            return;
        }
        if state
            .buffer
            .record_response(content_type.clone(), content_length)
        {
            debug!(bridge = %self.id, ?content_type, ?content_length, "Response metadata recorded");
            self.emit(LoaderEventKind::ResponseReceived {
                content_type,
                content_length,
            });
        }
        self.evaluate(&mut state);
    }

    /// Fetch callback: a chunk of body bytes arrived.
    pub(crate) fn on_bytes_received(&self, chunk: &[u8]) {
        let mut state = self.state.lock();
        if state.shut_down {
            return;
        }
        state.buffer.append(chunk);
        trace!(bridge = %self.id, chunk = chunk.len(), buffered = state.buffer.len(), "Bytes received");
        self.evaluate(&mut state);
    }

    /// Fetch callback: the download ended, with an error or not.
    pub(crate) fn on_fetch_completed(&self, error: Option<String>) {
        let mut state = self.state.lock();
        if !matches!(state.fetch, FetchState::InFlight(_)) {
            return;
        }

        match error {
            None => {
                info!(bridge = %self.id, bytes = state.buffer.len(), "Download completed");
                state.fetch = FetchState::Completed;
                self.emit(LoaderEventKind::DownloadCompleted(state.buffer.snapshot()));
            }
            Some(reason) => {
                warn!(bridge = %self.id, error = %reason, pending = state.pending.len(), "Download failed");
                state.fetch = FetchState::Failed(reason.clone());
                self.emit(LoaderEventKind::DownloadFailed(reason));
            }
        }
        self.evaluate(&mut state);
    }

    /// Re-check every pending request against the buffer.
    fn evaluate(&self, state: &mut LoaderState) {
        let info = state.buffer.content_info(&self.fallback_content_type);
        let available = state.buffer.len();
        let complete = matches!(state.fetch, FetchState::Completed);
        let failure = match &state.fetch {
            FetchState::Failed(reason) => Some(reason.clone()),
            _ => None,
        };

        for mut request in std::mem::take(&mut state.pending) {
            if request.is_abandoned() {
                trace!(bridge = %self.id, request = %request.id, "Dropping abandoned request");
                continue;
            }
            if let Some(info) = &info {
                request.respond_content_info(info);
            }

            let end = request.requested_end();
            if available > request.current_offset && request.current_offset < end {
                let upto = available.min(end);
                let bytes = state
                    .buffer
                    .slice(request.current_offset, upto - request.current_offset);
                request.respond_data(bytes);
            }

            if available >= end {
                trace!(bridge = %self.id, request = %request.id, "Request fulfilled");
                request.finish();
            } else if complete {
                trace!(bridge = %self.id, request = %request.id, "Request reached end of resource");
                request.finish();
            } else if let Some(reason) = &failure {
                request.fail(reason.clone());
            } else {
                state.pending.push(request);
            }
        }

        if !state.first_range_satisfied {
            if let Some((_, end)) = state.first_range {
                if available >= end || complete {
                    state.first_range_satisfied = true;
                    debug!(bridge = %self.id, buffered = available, "First requested range satisfied");
                    self.emit(LoaderEventKind::FirstRangeSatisfied);
                }
            }
        }
    }
}

/// Byte-range data source backed by a growing download buffer.
///
/// Cheap to clone; clones share the same buffer and fetch.
#[derive(Clone)]
pub struct ResourceLoaderBridge {
    inner: Arc<Inner>,
}

impl ResourceLoaderBridge {
    /// Bridge fetching `url` progressively on first submit.
    ///
    /// Must be called inside a tokio runtime; the fetch runs on it.
    pub fn network(
        url: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
        headers: HashMap<String, String>,
        fallback_content_type: impl Into<String>,
        events: Option<LoaderEventSender>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            PlaybackError::Internal("network bridge requires a tokio runtime".to_string())
        })?;

        Ok(Self::build(
            url.into(),
            Some(NetworkOrigin {
                http_client,
                headers,
                runtime,
            }),
            DownloadBuffer::new(),
            FetchState::NotStarted,
            fallback_content_type.into(),
            events,
        ))
    }

    /// Bridge serving bytes already held in memory. Never fetches.
    pub fn memory(
        url: impl Into<String>,
        bytes: Bytes,
        content_type: impl Into<String>,
        events: Option<LoaderEventSender>,
    ) -> Self {
        let content_type = content_type.into();
        Self::build(
            url.into(),
            None,
            DownloadBuffer::from_bytes(bytes, content_type.clone()),
            FetchState::Completed,
            content_type,
            events,
        )
    }

    fn build(
        url: String,
        network: Option<NetworkOrigin>,
        buffer: DownloadBuffer,
        fetch: FetchState,
        fallback_content_type: String,
        events: Option<LoaderEventSender>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: BridgeId::next(),
                url,
                network,
                fallback_content_type,
                state: Mutex::new(LoaderState {
                    buffer,
                    pending: Vec::new(),
                    fetch,
                    first_range: None,
                    first_range_satisfied: false,
                    shut_down: false,
                }),
                events,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn id(&self) -> BridgeId {
        self.inner.id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn is_in_memory(&self) -> bool {
        self.inner.network.is_none()
    }

    /// Whether the first range the engine asked for can be answered in full.
    pub fn first_range_satisfied(&self) -> bool {
        self.inner.state.lock().first_range_satisfied
    }

    pub fn buffered_len(&self) -> u64 {
        self.inner.state.lock().buffer.len()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.inner.state.lock().shut_down
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.inner.state.lock().fetch.status()
    }

    /// Stop the fetch and cancel every pending request.
    ///
    /// Idempotent. Later submits are cancelled immediately.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut state = self.inner.state.lock();
        if state.shut_down {
            return;
        }
        state.shut_down = true;

        if let FetchState::InFlight(session) = &state.fetch {
            session.abort();
            state.fetch = FetchState::Cancelled;
        }

        let pending = std::mem::take(&mut state.pending);
        if !pending.is_empty() {
            debug!(bridge = %self.inner.id, count = pending.len(), "Cancelling pending requests");
        }
        for request in pending {
            request.cancel();
        }
    }

    fn start_fetch(&self, origin: &NetworkOrigin) -> FetchSession {
        info!(
            bridge = %self.inner.id,
            url = %redact_url(&self.inner.url),
            "Starting download"
        );
        let request = HttpRequest::get(self.inner.url.clone()).headers(origin.headers.clone());
        FetchSession::start(
            &origin.runtime,
            Arc::downgrade(&self.inner),
            Arc::clone(&origin.http_client),
            request,
            self.inner.cancel.child_token(),
        )
    }
}

impl DataSource for ResourceLoaderBridge {
    fn content_info(&self) -> Option<ContentInfo> {
        self.inner
            .state
            .lock()
            .buffer
            .content_info(&self.inner.fallback_content_type)
    }

    fn submit(&self, request: PendingRequest) {
        let mut state = self.inner.state.lock();
        if state.shut_down {
            request.cancel();
            return;
        }

        trace!(
            bridge = %self.inner.id,
            request = %request.id,
            offset = request.requested_offset,
            length = request.requested_length,
            "Range requested"
        );
        if state.first_range.is_none() {
            state.first_range = Some((request.requested_offset, request.requested_end()));
        }
        state.pending.push(request);

        if matches!(state.fetch, FetchState::NotStarted) {
            if let Some(origin) = &self.inner.network {
                state.fetch = FetchState::InFlight(self.start_fetch(origin));
            }
        }

        self.inner.evaluate(&mut state);
    }

    fn cancel(&self, id: RequestId) {
        let mut state = self.inner.state.lock();
        if let Some(position) = state.pending.iter().position(|r| r.id == id) {
            state.pending.swap_remove(position);
            trace!(bridge = %self.inner.id, request = %id, "Request cancelled by engine");
        }
    }
}

impl fmt::Debug for ResourceLoaderBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoaderBridge")
            .field("id", &self.inner.id)
            .field("url", &redact_url(&self.inner.url))
            .field("in_memory", &self.is_in_memory())
            .finish_non_exhaustive()
    }
}

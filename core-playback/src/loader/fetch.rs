//! The single progressive download behind a network bridge.

use super::bridge::Inner;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::logging::redact_url;
use futures::StreamExt;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Handle to a running download task.
pub(crate) struct FetchSession {
    handle: JoinHandle<()>,
}

impl FetchSession {
    /// Spawn the download. The task only holds a weak reference to the
    /// bridge and stops once the bridge is gone or `cancel` fires.
    pub(crate) fn start(
        runtime: &Handle,
        bridge: Weak<Inner>,
        http_client: Arc<dyn HttpClient>,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Self {
        let handle = runtime.spawn(async move {
            let url = redact_url(&request.url);
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%url, "Download cancelled");
                }
                outcome = download(&bridge, http_client, request) => {
                    if let Some(inner) = bridge.upgrade() {
                        inner.on_fetch_completed(outcome.err());
                    }
                }
            }
        });
        Self { handle }
    }

    pub(crate) fn abort(&self) {
        self.handle.abort();
    }
}

/// Stream the body into the bridge. Errors come back as display strings,
/// which is all the bridge forwards to the engine.
async fn download(
    bridge: &Weak<Inner>,
    http_client: Arc<dyn HttpClient>,
    request: HttpRequest,
) -> std::result::Result<(), String> {
    let response = http_client
        .open_stream(request)
        .await
        .map_err(|e| e.to_string())?;

    if !response.is_success() {
        return Err(format!("HTTP {}", response.status));
    }

    match bridge.upgrade() {
        Some(inner) => {
            inner.on_response_metadata(response.content_type.clone(), response.content_length)
        }
        None => return Ok(()),
    }

    let mut body = response.body;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        if chunk.is_empty() {
            continue;
        }
        let Some(inner) = bridge.upgrade() else {
            trace!("Bridge dropped, abandoning download");
            return Ok(());
        };
        inner.on_bytes_received(&chunk);
    }

    Ok(())
}

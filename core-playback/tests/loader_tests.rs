//! Integration tests for the progressive loader
//!
//! These drive a network-backed bridge through its real fetch task, with
//! the response body fed chunk by chunk from the test.

mod common;

use bridge_traits::{DataSource, PendingRequest, RangeReceiver, RangeResponse};
use common::StreamingHttp;
use core_playback::loader::{FetchStatus, LoaderEvent, LoaderEventKind, ResourceLoaderBridge};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

const URL: &str = "http://x/a.mp3";

async fn pump() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn bridge_with_events(
    http: Arc<StreamingHttp>,
    headers: HashMap<String, String>,
) -> anyhow::Result<(ResourceLoaderBridge, mpsc::UnboundedReceiver<LoaderEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let bridge = ResourceLoaderBridge::network(URL, http, headers, "audio/mpeg", Some(tx))?;
    Ok((bridge, rx))
}

fn submit(bridge: &ResourceLoaderBridge, offset: u64, length: u64) -> RangeReceiver {
    let (request, rx) = PendingRequest::new(offset, length);
    bridge.submit(request);
    rx
}

fn delivered(responses: &[RangeResponse]) -> Vec<u8> {
    responses
        .iter()
        .filter_map(|r| match r {
            RangeResponse::Data { bytes, .. } => Some(bytes.to_vec()),
            _ => None,
        })
        .flatten()
        .collect()
}

fn is_finished(responses: &[RangeResponse]) -> bool {
    responses.iter().any(|r| *r == RangeResponse::Finished)
}

#[tokio::test]
async fn test_request_pending_until_bytes_arrive() -> anyhow::Result<()> {
    let http = StreamingHttp::new(Some("audio/mpeg"), Some(5000));
    let (bridge, _events) = bridge_with_events(http.clone(), HashMap::new())?;

    let mut rx = submit(&bridge, 0, 1000);
    pump().await;
    assert_eq!(http.open_count(), 1);

    let first = rx.drain();
    assert!(!is_finished(&first));
    assert!(delivered(&first).is_empty());

    let body: Vec<u8> = (0..1200u32).map(|i| (i % 251) as u8).collect();
    http.push(&body[..600]);
    pump().await;
    let partial = rx.drain();
    assert_eq!(delivered(&partial).len(), 600);
    assert!(!is_finished(&partial));

    http.push(&body[600..]);
    pump().await;
    let rest = rx.drain();
    assert!(is_finished(&rest));

    let mut all = delivered(&partial);
    all.extend(delivered(&rest));
    assert_eq!(all, body[..1000].to_vec());
    assert_eq!(bridge.pending_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_fulfilled_exactly_when_cumulative_bytes_reach_length() -> anyhow::Result<()> {
    let patterns: [&[usize]; 4] = [&[1000], &[999, 1], &[1, 1, 998, 5], &[300, 300, 300, 300]];

    for chunks in patterns {
        let http = StreamingHttp::new(None, None);
        let (bridge, _events) = bridge_with_events(http.clone(), HashMap::new())?;
        let mut rx = submit(&bridge, 0, 1000);
        pump().await;

        let mut cumulative = 0usize;
        let mut finished = false;
        for &size in chunks {
            http.push(&vec![7u8; size]);
            cumulative += size;
            pump().await;

            finished |= is_finished(&rx.drain());
            assert_eq!(finished, cumulative >= 1000, "chunks {:?} at {}", chunks, cumulative);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_only_one_fetch_for_many_requests() -> anyhow::Result<()> {
    let http = StreamingHttp::new(None, None);
    let (bridge, _events) = bridge_with_events(http.clone(), HashMap::new())?;

    let mut receivers: Vec<_> = (0..5).map(|i| submit(&bridge, i * 100, 100)).collect();
    pump().await;
    http.push(&[1u8; 500]);
    pump().await;

    assert_eq!(http.open_count(), 1);
    for rx in receivers.iter_mut() {
        assert!(is_finished(&rx.drain()));
    }

    // Re-reads are served from the buffer.
    let mut again = submit(&bridge, 0, 500);
    assert!(is_finished(&again.drain()));
    assert_eq!(http.open_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_fetch_carries_custom_headers() -> anyhow::Result<()> {
    let http = StreamingHttp::new(None, None);
    let headers = HashMap::from([("Icy-MetaData".to_string(), "1".to_string())]);
    let (bridge, _events) = bridge_with_events(http.clone(), headers)?;

    let _rx = submit(&bridge, 0, 10);
    pump().await;

    let request = http
        .last_request()
        .ok_or_else(|| anyhow::anyhow!("no request was issued"))?;
    assert_eq!(request.url, URL);
    assert_eq!(request.headers.get("Icy-MetaData"), Some(&"1".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_loader_events_in_order() -> anyhow::Result<()> {
    let http = StreamingHttp::new(Some("audio/mpeg; charset=binary"), Some(20));
    let (bridge, mut events) = bridge_with_events(http.clone(), HashMap::new())?;

    let mut rx = submit(&bridge, 0, 10);
    pump().await;
    http.push(&[1u8; 12]);
    http.push(&[2u8; 8]);
    http.finish();
    pump().await;

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| {
            assert_eq!(event.bridge, bridge.id());
            event.kind
        })
        .collect();
    assert_eq!(
        kinds[0],
        LoaderEventKind::ResponseReceived {
            content_type: Some("audio/mpeg; charset=binary".to_string()),
            content_length: Some(20),
        }
    );
    assert_eq!(kinds[1], LoaderEventKind::FirstRangeSatisfied);
    match &kinds[2] {
        LoaderEventKind::DownloadCompleted(bytes) => assert_eq!(bytes.len(), 20),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(kinds.len(), 3);

    let info = bridge
        .content_info()
        .ok_or_else(|| anyhow::anyhow!("content info missing"))?;
    assert_eq!(info.content_type, "audio/mpeg");
    assert_eq!(info.content_length, Some(20));
    assert!(matches!(rx.drain()[0], RangeResponse::ContentInfo(_)));
    assert_eq!(bridge.fetch_status(), FetchStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_fails_pending_requests() -> anyhow::Result<()> {
    let http = StreamingHttp::new(None, None);
    let (bridge, mut events) = bridge_with_events(http.clone(), HashMap::new())?;

    let mut satisfied = submit(&bridge, 0, 4);
    let mut starving = submit(&bridge, 0, 100);
    pump().await;
    http.push(&[0u8; 10]);
    http.fail("connection reset");
    pump().await;

    assert!(is_finished(&satisfied.drain()));
    let responses = starving.drain();
    assert!(matches!(responses.last(), Some(RangeResponse::Failed(reason)) if reason.contains("connection reset")));

    let failures = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event.kind, LoaderEventKind::DownloadFailed(_)))
        .count();
    assert_eq!(failures, 1);
    assert!(matches!(bridge.fetch_status(), FetchStatus::Failed(_)));

    // Buffered bytes still serve later reads.
    let mut late = submit(&bridge, 2, 5);
    assert!(is_finished(&late.drain()));
    assert_eq!(http.open_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_leaves_no_orphaned_requests() -> anyhow::Result<()> {
    let http = StreamingHttp::new(None, None);
    let (bridge, _events) = bridge_with_events(http.clone(), HashMap::new())?;

    let mut receivers: Vec<_> = (0..3).map(|i| submit(&bridge, i * 10, 10)).collect();
    pump().await;
    bridge.shutdown();
    http.push(&[0u8; 30]);
    pump().await;

    for rx in receivers.iter_mut() {
        assert_eq!(rx.drain(), vec![RangeResponse::Cancelled]);
    }
    assert_eq!(bridge.buffered_len(), 0);
    assert_eq!(bridge.fetch_status(), FetchStatus::Cancelled);
    Ok(())
}

//! # Host Bridge Traits
//!
//! Contracts between the playback core and the host platform.
//!
//! ## Traits
//!
//! ### Media
//! - [`PlaybackEngine`](playback::PlaybackEngine) - Decode/render engine with a typed event stream
//! - [`DataSource`](playback::DataSource) - Seekable byte source the engine pulls ranges from
//!
//! ### Networking & Storage
//! - [`HttpClient`](http::HttpClient) - Buffered and streaming HTTP requests
//! - [`NetworkMonitor`](network::NetworkMonitor) - Connectivity observation
//! - [`CacheStore`](storage::CacheStore) - Key-value cache for downloaded assets
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | HTTP, network |
//! | iOS      | host-provided       | Planned |
//! | Android  | host-provided       | Planned |
//!
//! The playback engine is always host-provided.
//!
//! ## Error Handling
//!
//! Every trait returns [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and keep messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across tokio tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod logging;
pub mod network;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy, StreamingResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use playback::{
    ContentInfo, DataSource, EngineEvent, EngineEventKind, EngineEventSink, EngineItem,
    EngineItemId, PendingRequest, PlaybackEngine, RangeReceiver, RangeResponse, RequestId,
};
pub use storage::CacheStore;

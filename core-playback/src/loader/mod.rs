//! # Progressive Loader
//!
//! Turns a single HTTP GET (or bytes already in memory) into a seekable
//! [`DataSource`](bridge_traits::DataSource) the playback engine reads
//! byte ranges from while the download is still running.
//!
//! - [`DownloadBuffer`]: append-only bytes plus the declared response head
//! - [`ResourceLoaderBridge`]: pending range requests served from the buffer
//! - `FetchSession`: the one download task behind a network bridge

pub mod bridge;
pub mod buffer;
mod fetch;

pub use bridge::{
    BridgeId, FetchStatus, LoaderEvent, LoaderEventKind, LoaderEventSender, ResourceLoaderBridge,
};
pub use buffer::DownloadBuffer;

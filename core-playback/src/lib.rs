//! # Playback & Streaming Module
//!
//! Progressive streaming cache and playback orchestration for network
//! audio.
//!
//! ## Overview
//!
//! This module handles:
//! - Serving a media engine's byte-range reads from a download that is
//!   still in flight ([`loader`])
//! - Playing static assets straight from a cache store, and writing them
//!   back once fully downloaded ([`cache`])
//! - The player state machine: resource assignment, readiness, transport,
//!   stall recovery and stream metadata/artwork ([`player`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlayerConfig, RadioPlayer, Resource};
//!
//! let player = RadioPlayer::builder(engine, http_client)
//!     .config(PlayerConfig::default())
//!     .delegate(delegate)
//!     .spawn()?;
//!
//! player.set_resource(Some(Resource::LiveFeed("https://radio.example/live".into())))?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod player;
pub mod resource;

pub use cache::{CacheStats, MemoryCacheConfig, MemoryCacheStore};
pub use config::PlayerConfig;
pub use error::{PlaybackError, Result};
pub use loader::{DownloadBuffer, LoaderEvent, LoaderEventKind, ResourceLoaderBridge};
pub use player::{
    AudioOutputClaim, EventBusDelegate, NoopDelegate, PlaybackState, PlayerDelegate, PlayerState,
    RadioPlayer, RadioPlayerBuilder,
};
pub use resource::Resource;

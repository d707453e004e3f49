//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the playback crates:
//! - Logging and tracing setup, plus URL/header redaction helpers
//! - Bridge wiring and feature flags (`CoreConfig`)
//! - Broadcast event bus for player and download events

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};

//! # Desktop Bridge Implementations
//!
//! Default implementations of the networking bridge traits for desktop
//! platforms (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`, including streaming bodies for
//!   progressive audio downloads
//! - `NetworkMonitor` using a TCP reachability probe
//!
//! The playback engine and cache store have no desktop default; hosts
//! inject their own.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopNetworkMonitor, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::new());
//! let network = Arc::new(DesktopNetworkMonitor::new());
//! ```

mod http;
mod network;

pub use http::ReqwestHttpClient;
pub use network::DesktopNetworkMonitor;

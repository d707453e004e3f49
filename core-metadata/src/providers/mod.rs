//! External Artwork Providers
//!
//! Each provider implements rate limiting and error handling to comply
//! with the service's terms of use.

#[cfg(feature = "artwork-remote")]
pub mod itunes;

#[cfg(feature = "artwork-remote")]
pub use itunes::ItunesArtworkClient;

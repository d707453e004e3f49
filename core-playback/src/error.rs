//! # Playback Error Types

use thiserror::Error;

/// Errors that can occur while loading or playing a resource.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Playability validation rejected the resource. Terminal for the
    /// assignment; the caller must assign a different resource.
    #[error("Resource is not playable: {0}")]
    ResourceUnplayable(String),

    /// Resource URL could not be used at all.
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    // ========================================================================
    // Loading Errors
    // ========================================================================
    /// The progressive download failed; pending reads were failed with it.
    #[error("Download failed: {0}")]
    FetchFailed(String),

    /// Playback still could not keep up after the recovery grace period.
    #[error("Playback stall not recovered after reload")]
    StallNotRecovered,

    /// Reading from the cache store failed. Treated as a miss by the player.
    #[error("Cache error: {0}")]
    CacheError(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The playback engine reported a failed item.
    #[error("Playback engine error: {0}")]
    EngineError(String),

    /// The player task is gone.
    #[error("Player has been shut down")]
    PlayerShutDown,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if a later attempt on the same resource may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::FetchFailed(_)
                | PlaybackError::StallNotRecovered
                | PlaybackError::CacheError(_)
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        match self {
            PlaybackError::FetchFailed(_) | PlaybackError::StallNotRecovered => true,
            PlaybackError::Bridge(bridge_traits::BridgeError::HttpStatus { .. }) => true,
            _ => false,
        }
    }

    /// Returns `true` if the error ends the current resource assignment.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackError::ResourceUnplayable(_)
                | PlaybackError::InvalidResource(_)
                | PlaybackError::EngineError(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

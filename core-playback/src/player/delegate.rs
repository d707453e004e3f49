//! Player notifications

use super::state::{AudioOutputClaim, PlaybackState, PlayerState};
use crate::error::PlaybackError;
use crate::resource::Resource;
use core_metadata::StreamMetadata;
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use tracing::trace;

/// Receiver of player notifications.
///
/// Every method has a no-op default; implement only what you need. All
/// calls are made from the player task, in order, once per actual change.
/// Implementations must not block.
pub trait PlayerDelegate: Send + Sync {
    fn player_state_changed(&self, _state: PlayerState) {}

    fn playback_state_changed(&self, _state: PlaybackState) {}

    /// `None` when the resource was cleared.
    fn resource_changed(&self, _resource: Option<&Resource>) {}

    fn metadata_changed(&self, _metadata: Option<&StreamMetadata>) {}

    fn artwork_changed(&self, _url: Option<&str>) {}

    fn audio_output_changed(&self, _claim: AudioOutputClaim) {}

    fn player_error(&self, _error: &PlaybackError) {}
}

/// Delegate that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

impl PlayerDelegate for NoopDelegate {}

/// Delegate republishing every notification on an [`EventBus`].
#[derive(Debug, Clone)]
pub struct EventBusDelegate {
    bus: EventBus,
}

impl EventBusDelegate {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, event: PlayerEvent) {
        // No subscribers is fine.
        if self.bus.emit(CoreEvent::Player(event)).is_err() {
            trace!("Player event dropped, no subscribers");
        }
    }
}

impl PlayerDelegate for EventBusDelegate {
    fn player_state_changed(&self, state: PlayerState) {
        self.publish(PlayerEvent::StateChanged {
            state: state.to_string(),
        });
    }

    fn playback_state_changed(&self, state: PlaybackState) {
        self.publish(PlayerEvent::PlaybackStateChanged {
            state: state.to_string(),
        });
    }

    fn resource_changed(&self, resource: Option<&Resource>) {
        self.publish(PlayerEvent::ResourceChanged {
            url: resource.map(|r| r.url().to_string()),
            live: resource.map_or(false, Resource::is_live),
        });
    }

    fn metadata_changed(&self, metadata: Option<&StreamMetadata>) {
        self.publish(PlayerEvent::MetadataChanged {
            raw: metadata.map(|m| m.raw.clone()),
            artist: metadata.and_then(|m| m.artist.clone()),
            title: metadata.and_then(|m| m.title.clone()),
        });
    }

    fn artwork_changed(&self, url: Option<&str>) {
        self.publish(PlayerEvent::ArtworkChanged {
            url: url.map(str::to_string),
        });
    }

    fn audio_output_changed(&self, claim: AudioOutputClaim) {
        self.publish(PlayerEvent::AudioOutputChanged {
            exclusive: claim == AudioOutputClaim::Acquire,
        });
    }

    fn player_error(&self, error: &PlaybackError) {
        self.publish(PlayerEvent::Error {
            message: error.to_string(),
            recoverable: !error.is_terminal(),
        });
    }
}

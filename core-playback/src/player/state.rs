//! Player and playback state enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness of the current data source.
///
/// ```text
/// UrlNotSet ─> Loading ─┬─> ReadyToPlay ⇄ Loading
///                       ├─> LoadingFinished ⇄ Loading
///                       └─> Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    UrlNotSet,
    Loading,
    ReadyToPlay,
    /// Ready, and the engine predicts uninterrupted playback
    LoadingFinished,
    Error,
}

impl PlayerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerState::UrlNotSet => "url_not_set",
            PlayerState::Loading => "loading",
            PlayerState::ReadyToPlay => "ready_to_play",
            PlayerState::LoadingFinished => "loading_finished",
            PlayerState::Error => "error",
        }
    }

    /// Whether playback can proceed without waiting for more data.
    pub fn is_ready(&self) -> bool {
        matches!(self, PlayerState::ReadyToPlay | PlayerState::LoadingFinished)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport intent, independent of [`PlayerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exclusive audio output request raised on entering or leaving `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutputClaim {
    Acquire,
    Release,
}

/// Assign `next` to `slot`. Returns `false` when the value is unchanged, so
/// callers only notify on real transitions.
pub(crate) fn transition<T: PartialEq>(slot: &mut T, next: T) -> bool {
    if *slot == next {
        return false;
    }
    *slot = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_reports_only_changes() {
        let mut state = PlayerState::UrlNotSet;
        assert!(transition(&mut state, PlayerState::Loading));
        assert!(!transition(&mut state, PlayerState::Loading));
        assert_eq!(state, PlayerState::Loading);
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(PlayerState::ReadyToPlay.to_string(), "ready_to_play");
        assert_eq!(
            serde_json::to_string(&PlayerState::LoadingFinished).unwrap(),
            "\"loading_finished\""
        );
        assert_eq!(PlaybackState::Paused.to_string(), "paused");
    }

    #[test]
    fn ready_states() {
        assert!(PlayerState::ReadyToPlay.is_ready());
        assert!(PlayerState::LoadingFinished.is_ready());
        assert!(!PlayerState::Loading.is_ready());
    }
}

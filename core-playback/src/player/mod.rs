//! # Player
//!
//! [`RadioPlayer`] is a handle to a task that owns the current resource,
//! the loader pipeline feeding the engine, and the two state machines
//! ([`PlayerState`], [`PlaybackState`]). Notifications go to a
//! [`PlayerDelegate`].

pub mod delegate;
mod handle;
mod orchestrator;
pub mod state;

pub use delegate::{EventBusDelegate, NoopDelegate, PlayerDelegate};
pub use handle::{RadioPlayer, RadioPlayerBuilder};
pub use state::{AudioOutputClaim, PlaybackState, PlayerState};

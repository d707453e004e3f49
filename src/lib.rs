//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `radio-core`, enable
//! `desktop-shims` and/or `artwork-remote`, and reach the player through the
//! re-exported service façade.

pub use core_service::*;

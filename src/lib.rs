//! Library entry point.
//!
//! Behavior components for a Bevy scene: spawning, projectile motion, collision probing,
//! look-at tracking, physics impulses and hyperlinks.
//!
//! Integration tests in `tests/` are compiled as separate crates.
//! A `lib.rs` gives them a stable public API surface to import.

pub mod game;
pub mod common;
pub mod plugins;

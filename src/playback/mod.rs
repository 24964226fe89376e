//! Bounded playback against the external player.

mod navigator;
mod scheduler;

pub use navigator::{ClipNavigator, DEFAULT_READY_POLL_INTERVAL};
pub use scheduler::PlaybackScheduler;

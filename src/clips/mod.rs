//! Saved clips and their persistence.

mod clip;
mod number;
mod store;

pub use clip::{Clip, ClipId, ClipIdGenerator};
pub use store::{ClipStore, CLIPS_KEY, LAST_VIDEO_KEY};

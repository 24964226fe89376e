//! Session orchestration: clip editing, saved clips and voice recording.

mod editor;
mod orchestrator;

pub use editor::{ClipEditor, Nudge};
pub use orchestrator::Session;

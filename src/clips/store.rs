//! Clip list persistence over a [`KeyValueStore`].

use super::Clip;
use crate::error::StorageError;
use crate::storage::KeyValueStore;
use log::{debug, warn};
use std::sync::Arc;

pub const CLIPS_KEY: &str = "__CLIPS__";
pub const LAST_VIDEO_KEY: &str = "__LAST_VIDEO_ID__";

/// Stateless read/write surface; the in-memory list lives with the caller.
#[derive(Clone)]
pub struct ClipStore {
    storage: Arc<dyn KeyValueStore>,
}

impl ClipStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the persisted clip list. Absent, unreadable or invalid data all
    /// yield an empty list. Validation is all-or-nothing: one malformed
    /// element discards the whole list.
    pub fn load(&self) -> Vec<Clip> {
        let raw = match self.storage.get(CLIPS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("[clips] failed to read stored clips: {}", e);
                return Vec::new();
            }
        };
        match parse_clips(&raw) {
            Some(clips) => {
                debug!("[clips] loaded {} clips", clips.len());
                clips
            }
            None => {
                debug!("[clips] stored clips are invalid, starting empty");
                Vec::new()
            }
        }
    }

    /// Apply `transform` to `current`, write the full result, and return it.
    /// Nothing is written if serialization fails; write failures propagate.
    pub fn save<F>(&self, current: &[Clip], transform: F) -> Result<Vec<Clip>, StorageError>
    where
        F: FnOnce(Vec<Clip>) -> Vec<Clip>,
    {
        let next = transform(current.to_vec());
        let json = serde_json::to_string(&next)?;
        self.storage.set(CLIPS_KEY, &json)?;
        debug!("[clips] saved {} clips", next.len());
        Ok(next)
    }

    pub fn load_last_video_id(&self) -> Option<String> {
        match self.storage.get(LAST_VIDEO_KEY) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("[clips] failed to read last video id: {}", e);
                None
            }
        }
    }

    pub fn save_last_video_id(&self, video_id: &str) -> Result<(), StorageError> {
        self.storage.set(LAST_VIDEO_KEY, video_id)
    }
}

fn parse_clips(raw: &str) -> Option<Vec<Clip>> {
    if raw.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}

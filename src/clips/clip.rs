use super::number;
use crate::time_format::format_video_time;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title characters kept in a clip's list label.
const LABEL_TITLE_CHARS: usize = 8;

/// Clip identity. Older lists hold random fractional ids, so any JSON
/// number is accepted; new ids are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(#[serde(with = "number")] f64);

impl ClipId {
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl From<u64> for ClipId {
    fn from(id: u64) -> Self {
        Self(id as f64)
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved `{video, start, end}` bookmark. `end_time >= start_time` is not
/// enforced; a reversed window plays and pauses immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(with = "number")]
    pub start_time: f64,
    #[serde(with = "number")]
    pub end_time: f64,
}

impl Clip {
    /// Short list label, e.g. `Never go... 00:01.2 - 00:03.4`.
    pub fn label(&self) -> String {
        let title: String = self.title.chars().take(LABEL_TITLE_CHARS).collect();
        format!(
            "{}... {} - {}",
            title,
            format_video_time(self.start_time),
            format_video_time(self.end_time)
        )
    }
}

/// Monotonic clip id source, seeded past every id already in the list.
#[derive(Debug, Clone, Default)]
pub struct ClipIdGenerator {
    next: u64,
}

impl ClipIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the counter past every id in `clips`. Never moves backwards.
    /// Negative and non-finite ids are ignored.
    pub fn observe(&mut self, clips: &[Clip]) {
        let max = clips
            .iter()
            .map(|c| c.id.as_f64())
            .filter(|id| id.is_finite() && *id >= 0.0)
            .fold(None, |acc: Option<f64>, id| Some(acc.map_or(id, |m| m.max(id))));
        if let Some(max) = max {
            // `as` saturates for ids beyond u64.
            let floor = max.floor() as u64;
            self.next = self.next.max(floor.saturating_add(1));
        }
    }

    /// The id the next clip will get, without reserving it. The counter
    /// only advances once a list holding it is observed.
    pub fn peek(&self) -> ClipId {
        ClipId::from(self.next)
    }

    pub fn next_id(&mut self) -> ClipId {
        let id = self.peek();
        self.next = self.next.saturating_add(1);
        id
    }
}

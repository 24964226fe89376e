//! The externally-owned embedded video player, seen through the handful of
//! commands and queries the session needs.

mod video_id;

pub use video_id::parse_video_id;

use tokio::sync::watch;

/// Player state as reported by the embed API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    VideoCued,
}

impl PlayerState {
    /// Map the embed API's numeric state codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::VideoCued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoData {
    pub title: String,
    pub video_id: String,
}

/// Capability surface of the player widget. Commands are fire-and-forget;
/// the widget loads and seeks asynchronously on its own.
pub trait VideoPlayer: Send + Sync {
    fn load_video_by_id(&self, video_id: &str);
    fn current_time(&self) -> f64;
    fn seek_to(&self, seconds: f64);
    fn play_video(&self);
    fn pause_video(&self);
    fn video_data(&self) -> VideoData;
    fn player_state(&self) -> PlayerState;

    /// Push notifications of state changes, for players that can provide
    /// them. Players returning `None` are polled instead.
    fn subscribe_state(&self) -> Option<watch::Receiver<PlayerState>> {
        None
    }
}

//! Play a clip that may belong to a video other than the loaded one.

use super::PlaybackScheduler;
use crate::video::{PlayerState, VideoPlayer};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// How often to ask the player for its state while waiting for a freshly
/// loaded video to start.
pub const DEFAULT_READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct ClipNavigator {
    poll_interval: Duration,
}

impl Default for ClipNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_READY_POLL_INTERVAL)
    }
}

impl ClipNavigator {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Play `start_time..end_time` of `video_id`. If another video is loaded,
    /// load this one and wait until the player reports `Playing` before
    /// seeking; a seek issued earlier would land on the old video's timeline.
    /// There is no timeout: a player that never starts stalls this call.
    pub async fn play_clip(
        &self,
        player: &Arc<dyn VideoPlayer>,
        scheduler: &mut PlaybackScheduler,
        video_id: &str,
        start_time: f64,
        end_time: f64,
    ) {
        let loaded = player.video_data().video_id;
        if loaded != video_id {
            info!("[navigator] switching video {} -> {}", loaded, video_id);
            player.load_video_by_id(video_id);
            self.wait_until_playing(player.as_ref()).await;
        }
        scheduler.play_window(player, start_time, end_time);
    }

    async fn wait_until_playing(&self, player: &dyn VideoPlayer) {
        if let Some(mut states) = player.subscribe_state() {
            if states.wait_for(|s| *s == PlayerState::Playing).await.is_ok() {
                debug!("[navigator] player reported playing");
                return;
            }
            debug!("[navigator] state feed closed, falling back to polling");
        }

        let mut polls = 0u64;
        while player.player_state() != PlayerState::Playing {
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;
        }
        debug!("[navigator] player playing after {} polls", polls);
    }
}

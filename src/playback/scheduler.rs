//! Bounded playback windows with a single cancellable pause timer.

use crate::video::VideoPlayer;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns the one pending "pause the player" timer. Each new window cancels
/// the previous timer before scheduling its own, so timers never stack.
#[derive(Default)]
pub struct PlaybackScheduler {
    pending_pause: Option<JoinHandle<()>>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seek to `start_time`, play, and pause `end_time - start_time` seconds
    /// later. A reversed window pauses immediately. Must be called from
    /// within a tokio runtime.
    pub fn play_window(&mut self, player: &Arc<dyn VideoPlayer>, start_time: f64, end_time: f64) {
        player.seek_to(start_time);
        player.play_video();
        self.cancel();

        let delay = window_duration(start_time, end_time);
        debug!(
            "[playback] window {:.2}..{:.2}s, pausing in {:?}",
            start_time, end_time, delay
        );
        let player = Arc::clone(player);
        self.pending_pause = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            player.pause_video();
        }));
    }

    /// Cancel the pending pause, if any. The player keeps playing.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending_pause.take() {
            handle.abort();
        }
    }

    pub fn has_pending_pause(&self) -> bool {
        self.pending_pause
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn window_duration(start_time: f64, end_time: f64) -> Duration {
    let secs = (end_time - start_time).max(0.0);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakePlayer, PlayerCall};
    use tokio::time::sleep;

    fn player() -> (Arc<FakePlayer>, Arc<dyn VideoPlayer>) {
        let fake = Arc::new(FakePlayer::new("abc", "Title"));
        let player: Arc<dyn VideoPlayer> = fake.clone();
        (fake, player)
    }

    #[tokio::test(start_paused = true)]
    async fn seeks_plays_then_pauses_at_window_end() {
        let (fake, player) = player();
        let mut scheduler = PlaybackScheduler::new();

        scheduler.play_window(&player, 2.0, 4.5);
        assert_eq!(fake.calls(), vec![PlayerCall::Seek(2.0), PlayerCall::Play]);
        assert!(scheduler.has_pending_pause());

        sleep(Duration::from_millis(2400)).await;
        assert_eq!(fake.pauses(), 0);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(fake.pauses(), 1);
        assert!(!scheduler.has_pending_pause());
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_window_replaces_the_pending_pause() {
        let (fake, player) = player();
        let mut scheduler = PlaybackScheduler::new();

        scheduler.play_window(&player, 0.0, 5.0);
        sleep(Duration::from_secs(1)).await;
        scheduler.play_window(&player, 0.0, 5.0);

        // The first timer would have fired at t=5.
        sleep(Duration::from_millis(4500)).await;
        assert_eq!(fake.pauses(), 0);
        assert!(scheduler.has_pending_pause());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(fake.pauses(), 1);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(fake.pauses(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reversed_window_pauses_immediately() {
        let (fake, player) = player();
        let mut scheduler = PlaybackScheduler::new();

        scheduler.play_window(&player, 5.0, 3.0);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(
            fake.calls(),
            vec![PlayerCall::Seek(5.0), PlayerCall::Play, PlayerCall::Pause]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_leaves_the_player_playing() {
        let (fake, player) = player();
        let mut scheduler = PlaybackScheduler::new();

        scheduler.play_window(&player, 0.0, 1.0);
        scheduler.cancel();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(fake.pauses(), 0);
        assert!(!scheduler.has_pending_pause());
    }

    #[test]
    fn window_duration_clamps_and_saturates() {
        assert_eq!(window_duration(1.0, 3.5), Duration::from_millis(2500));
        assert_eq!(window_duration(5.0, 3.0), Duration::ZERO);
        assert_eq!(window_duration(0.0, f64::INFINITY), Duration::MAX);
    }
}

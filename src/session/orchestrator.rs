//! One user's practice session: the clip editor, the saved clip list, the
//! player it drives and the voice recorder.

use super::editor::{ClipEditor, Nudge};
use crate::audio::{AudioCapture, AudioDevice, AudioOutput, AudioStateKind};
use crate::clips::{Clip, ClipId, ClipIdGenerator, ClipStore};
use crate::error::{CaptureError, StorageError};
use crate::playback::{ClipNavigator, PlaybackScheduler};
use crate::settings::Settings;
use crate::storage::KeyValueStore;
use crate::video::{parse_video_id, VideoPlayer};
use log::{debug, info};
use std::sync::Arc;

/// Player-dependent actions are no-ops until [`Session::attach_player`] is
/// called. The clip list starts empty and is only filled by
/// [`Session::hydrate`], so a view rendered before storage is reachable
/// matches the first interactive one.
pub struct Session {
    settings: Settings,
    store: ClipStore,
    clips: Vec<Clip>,
    ids: ClipIdGenerator,
    editor: ClipEditor,
    player: Option<Arc<dyn VideoPlayer>>,
    scheduler: PlaybackScheduler,
    navigator: ClipNavigator,
    recorder: AudioCapture,
}

impl Session {
    pub fn new(
        settings: Settings,
        storage: Arc<dyn KeyValueStore>,
        device: Arc<dyn AudioDevice>,
        output: Arc<dyn AudioOutput>,
    ) -> Self {
        let recorder = AudioCapture::new(device, output, settings.codec_preferences.clone());
        Self {
            store: ClipStore::new(storage),
            clips: Vec::new(),
            ids: ClipIdGenerator::new(),
            editor: ClipEditor::new(settings.nudge_step_secs),
            player: None,
            scheduler: PlaybackScheduler::new(),
            navigator: ClipNavigator::new(settings.ready_poll_interval()),
            recorder,
            settings,
        }
    }

    /// Replace the empty initial clip list with the persisted one. Returns
    /// the video the player should start on.
    pub fn hydrate(&mut self) -> String {
        self.clips = self.store.load();
        self.ids.observe(&self.clips);
        let video_id = self
            .store
            .load_last_video_id()
            .unwrap_or_else(|| self.settings.default_video_id.clone());
        info!(
            "[session] hydrated {} clips, initial video {}",
            self.clips.len(),
            video_id
        );
        video_id
    }

    pub fn attach_player(&mut self, player: Arc<dyn VideoPlayer>) {
        self.player = Some(player);
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn editor(&self) -> &ClipEditor {
        &self.editor
    }

    pub fn nudge_start(&mut self, nudge: Nudge) {
        self.editor.nudge_start(nudge);
    }

    pub fn nudge_end(&mut self, nudge: Nudge) {
        self.editor.nudge_end(nudge);
    }

    /// Set the start time to the player's position.
    pub fn mark_start(&mut self) {
        if let Some(player) = self.player_or_log("mark start") {
            let now = player.current_time();
            self.editor.set_start(now);
        }
    }

    pub fn mark_end(&mut self) {
        if let Some(player) = self.player_or_log("mark end") {
            let now = player.current_time();
            self.editor.set_end(now);
        }
    }

    /// Load the video named by `input` (an id or a watch/short link) and
    /// remember it for the next session. Returns the parsed id, or `None`
    /// when no player is attached.
    pub fn load_video(&mut self, input: &str) -> Result<Option<String>, StorageError> {
        let Some(player) = self.player_or_log("load video") else {
            return Ok(None);
        };
        let video_id = parse_video_id(input.trim());
        player.load_video_by_id(&video_id);
        self.store.save_last_video_id(&video_id)?;
        Ok(Some(video_id))
    }

    /// Play the window being edited on whatever video is loaded.
    pub fn play_edited_clip(&mut self) -> bool {
        let Some(player) = self.player_or_log("play clip") else {
            return false;
        };
        self.scheduler
            .play_window(&player, self.editor.start_time(), self.editor.end_time());
        true
    }

    /// Append the edited window of the loaded video to the clip list. The
    /// id is only consumed once the write succeeds.
    pub fn save_edited_clip(&mut self) -> Result<Option<Clip>, StorageError> {
        let Some(player) = self.player_or_log("save clip") else {
            return Ok(None);
        };
        let data = player.video_data();
        let clip = Clip {
            id: self.ids.peek(),
            video_id: data.video_id,
            title: data.title,
            start_time: self.editor.start_time(),
            end_time: self.editor.end_time(),
        };
        let added = clip.clone();
        self.save_clips(move |mut clips| {
            clips.push(added);
            clips
        })?;
        Ok(Some(clip))
    }

    /// Remove the clip with `id`. Unknown ids leave the list unchanged but
    /// still rewrite it.
    pub fn delete_clip(&mut self, id: ClipId) -> Result<(), StorageError> {
        self.save_clips(|clips| clips.into_iter().filter(|c| c.id != id).collect())
    }

    /// Play a saved clip, switching videos first if needed.
    pub async fn play_saved_clip(&mut self, id: ClipId) -> bool {
        let Some(player) = self.player_or_log("play saved clip") else {
            return false;
        };
        let Some(clip) = self.clips.iter().find(|c| c.id == id).cloned() else {
            debug!("[session] no clip with id {}", id);
            return false;
        };
        self.navigator
            .play_clip(
                &player,
                &mut self.scheduler,
                &clip.video_id,
                clip.start_time,
                clip.end_time,
            )
            .await;
        true
    }

    pub async fn toggle_record(&mut self) -> Result<(), CaptureError> {
        self.recorder.toggle_record().await
    }

    pub fn listen(&self) -> Result<bool, CaptureError> {
        self.recorder.listen()
    }

    pub fn audio_state(&self) -> AudioStateKind {
        self.recorder.state()
    }

    pub fn has_pending_pause(&self) -> bool {
        self.scheduler.has_pending_pause()
    }

    /// Write-through update of the clip list; the in-memory list only changes
    /// once the write succeeded.
    fn save_clips<F>(&mut self, transform: F) -> Result<(), StorageError>
    where
        F: FnOnce(Vec<Clip>) -> Vec<Clip>,
    {
        self.clips = self.store.save(&self.clips, transform)?;
        self.ids.observe(&self.clips);
        Ok(())
    }

    fn player_or_log(&self, action: &str) -> Option<Arc<dyn VideoPlayer>> {
        if self.player.is_none() {
            debug!("[session] {} ignored, no player attached", action);
        }
        self.player.clone()
    }
}

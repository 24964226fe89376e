//! Record / stop / listen state machine for the user's voice.
//!
//! The microphone is acquired lazily on the first toggle and released when a
//! recording stops, so every recording session asks the device again and the
//! capture indicator is off between recordings.

use super::codec::select_mime_type;
use super::{AudioDevice, AudioOutput, AudioStream, Capture, MediaRecorder, RecorderEvent};
use crate::error::CaptureError;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedAudio {
    NoAudioSaved,
    RecordingAudio,
    RecordedAudio(Capture),
}

/// [`SavedAudio`] without the payload, for driving button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStateKind {
    NoAudioSaved,
    RecordingAudio,
    RecordedAudio,
}

impl SavedAudio {
    pub fn kind(&self) -> AudioStateKind {
        match self {
            SavedAudio::NoAudioSaved => AudioStateKind::NoAudioSaved,
            SavedAudio::RecordingAudio => AudioStateKind::RecordingAudio,
            SavedAudio::RecordedAudio(_) => AudioStateKind::RecordedAudio,
        }
    }
}

/// Stream and recorder held from acquisition until the recording stops.
struct LiveDevice {
    stream: Box<dyn AudioStream>,
    recorder: Box<dyn MediaRecorder>,
    events: mpsc::UnboundedReceiver<RecorderEvent>,
}

pub struct AudioCapture {
    device: Arc<dyn AudioDevice>,
    output: Arc<dyn AudioOutput>,
    codec_preferences: Vec<String>,
    live: Option<LiveDevice>,
    saved: SavedAudio,
    last_error: Option<CaptureError>,
}

impl AudioCapture {
    pub fn new(
        device: Arc<dyn AudioDevice>,
        output: Arc<dyn AudioOutput>,
        codec_preferences: Vec<String>,
    ) -> Self {
        Self {
            device,
            output,
            codec_preferences,
            live: None,
            saved: SavedAudio::NoAudioSaved,
            last_error: None,
        }
    }

    pub fn saved(&self) -> &SavedAudio {
        &self.saved
    }

    pub fn state(&self) -> AudioStateKind {
        self.saved.kind()
    }

    /// The failure of the most recent toggle, cleared by the next success.
    pub fn last_error(&self) -> Option<&CaptureError> {
        self.last_error.as_ref()
    }

    pub fn can_listen(&self) -> bool {
        matches!(self.saved, SavedAudio::RecordedAudio(_))
    }

    /// Start a recording, or stop the one in progress.
    ///
    /// The first toggle of a session waits for microphone access. If access
    /// fails the state is left as it was and the error is returned.
    /// Stopping waits for the recorder's final chunk.
    pub async fn toggle_record(&mut self) -> Result<(), CaptureError> {
        let result = self.toggle().await;
        match &result {
            Ok(()) => self.last_error = None,
            Err(e) => {
                warn!("[recorder] toggle failed in {:?}: {}", self.state(), e);
                self.last_error = Some(e.clone());
            }
        }
        result
    }

    /// Play the latest capture. Returns `false` without doing anything
    /// unless a capture exists.
    pub fn listen(&self) -> Result<bool, CaptureError> {
        match &self.saved {
            SavedAudio::RecordedAudio(capture) => {
                debug!(
                    "[recorder] playing capture {} ({} bytes, {})",
                    capture.id,
                    capture.bytes.len(),
                    capture.mime_type
                );
                self.output.play(capture)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn toggle(&mut self) -> Result<(), CaptureError> {
        if self.live.is_none() {
            self.live = Some(self.acquire().await?);
        }
        match self.saved {
            SavedAudio::RecordingAudio => self.finish_recording().await,
            SavedAudio::NoAudioSaved | SavedAudio::RecordedAudio(_) => self.begin_recording(),
        }
    }

    async fn acquire(&self) -> Result<LiveDevice, CaptureError> {
        info!("[recorder] requesting microphone");
        let stream = self.device.request_stream().await?;
        let mime_type = self.preferred_mime_type();
        let (tx, events) = mpsc::unbounded_channel();
        let recorder = match self.device.create_recorder(stream.as_ref(), mime_type, tx) {
            Ok(recorder) => recorder,
            Err(e) => {
                stream.stop_tracks();
                return Err(e);
            }
        };
        Ok(LiveDevice {
            stream,
            recorder,
            events,
        })
    }

    fn begin_recording(&mut self) -> Result<(), CaptureError> {
        let live = self
            .live
            .as_mut()
            .ok_or_else(|| CaptureError::Device("no microphone stream".into()))?;
        // Anything left over belongs to an earlier recording.
        while live.events.try_recv().is_ok() {}
        if let Err(e) = live.recorder.start() {
            // The next toggle reacquires the microphone.
            self.release_device();
            return Err(e);
        }

        let previous = std::mem::replace(&mut self.saved, SavedAudio::RecordingAudio);
        if let SavedAudio::RecordedAudio(capture) = previous {
            self.output.release(capture.id);
        }
        info!("[recorder] recording");
        Ok(())
    }

    async fn finish_recording(&mut self) -> Result<(), CaptureError> {
        let mut live = self
            .live
            .take()
            .ok_or_else(|| CaptureError::Device("no microphone stream".into()))?;
        let collected = collect_until_stopped(&mut live).await;
        live.stream.stop_tracks();

        match collected {
            Ok(bytes) => {
                let mime_type = match self.preferred_mime_type() {
                    Some(mime) => mime.to_string(),
                    None => {
                        let fallback = live.recorder.mime_type();
                        warn!(
                            "[recorder] no preferred codec supported, keeping recorder's {}",
                            fallback
                        );
                        fallback
                    }
                };
                let capture = Capture::new(mime_type, bytes);
                info!(
                    "[recorder] recorded {} bytes as {}",
                    capture.bytes.len(),
                    capture.mime_type
                );
                self.saved = SavedAudio::RecordedAudio(capture);
                Ok(())
            }
            Err(e) => {
                self.saved = SavedAudio::NoAudioSaved;
                Err(e)
            }
        }
    }

    fn release_device(&mut self) {
        if let Some(live) = self.live.take() {
            live.stream.stop_tracks();
            debug!("[recorder] microphone released");
        }
    }

    fn preferred_mime_type(&self) -> Option<&str> {
        select_mime_type(&self.codec_preferences, |mime| {
            self.device.is_type_supported(mime)
        })
    }
}

async fn collect_until_stopped(live: &mut LiveDevice) -> Result<Vec<u8>, CaptureError> {
    live.recorder.stop()?;
    let mut bytes = Vec::new();
    loop {
        match live.events.recv().await {
            Some(RecorderEvent::Data(chunk)) => bytes.extend_from_slice(&chunk),
            Some(RecorderEvent::Stopped) => return Ok(bytes),
            None => return Err(CaptureError::RecorderClosed),
        }
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.release_device();
        if let SavedAudio::RecordedAudio(capture) = &self.saved {
            self.output.release(capture.id);
        }
    }
}

//! Microphone capture for recording and replaying the user's voice.

mod buffer;
mod codec;
mod recorder;
mod wav;

#[cfg(feature = "cpal-device")]
mod cpal_device;

pub use buffer::SampleBuffer;
pub use codec::{select_mime_type, DEFAULT_CODEC_PREFERENCES};
pub use recorder::{AudioCapture, AudioStateKind, SavedAudio};
pub use wav::{encode_wav, WAV_MIME_TYPE};

#[cfg(feature = "cpal-device")]
pub use cpal_device::CpalDevice;

use crate::error::CaptureError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Emitted by a [`MediaRecorder`] while capturing and once when it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Data(Vec<u8>),
    Stopped,
}

/// A live microphone stream. Holding one keeps the device reserved.
pub trait AudioStream: Send + Sync {
    /// Release the hardware tracks; the stream is unusable afterwards.
    fn stop_tracks(&self);
}

/// Records from a stream. Chunks and the final `Stopped` event go to the
/// channel handed to [`AudioDevice::create_recorder`]; `stop` only requests
/// the stop.
pub trait MediaRecorder: Send + Sync {
    fn start(&mut self) -> Result<(), CaptureError>;
    fn stop(&mut self) -> Result<(), CaptureError>;
    /// Container the recorder emits when no preferred codec is supported.
    fn mime_type(&self) -> String;
}

#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Ask for microphone access and open a stream. May wait on a
    /// permission prompt.
    async fn request_stream(&self) -> Result<Box<dyn AudioStream>, CaptureError>;

    fn create_recorder(
        &self,
        stream: &dyn AudioStream,
        mime_type: Option<&str>,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError>;

    fn is_type_supported(&self, mime_type: &str) -> bool;
}

/// A finished recording, ready to be played back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub id: Uuid,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Capture {
    pub fn new(mime_type: String, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type,
            bytes,
        }
    }
}

/// Plays captures back to the user.
pub trait AudioOutput: Send + Sync {
    fn play(&self, capture: &Capture) -> Result<(), CaptureError>;

    /// Free whatever the output prepared for `capture_id`. Called once the
    /// capture can no longer be played.
    fn release(&self, _capture_id: Uuid) {}
}

//! Default input device via cpal.
//!
//! The cpal stream lives on its own thread for as long as the microphone is
//! held; the recorder toggles whether callbacks keep their samples and emits
//! the whole recording as one WAV chunk on stop.

use super::buffer::SampleBuffer;
use super::wav::{encode_wav, WAV_MIME_TYPE};
use super::{AudioDevice, AudioStream, MediaRecorder, RecorderEvent};
use crate::error::CaptureError;
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How often the capture thread checks whether the tracks were stopped.
const STOP_POLL: Duration = Duration::from_millis(20);

struct Shared {
    buffer: Mutex<SampleBuffer>,
    recording: AtomicBool,
    stop_flag: AtomicBool,
    sample_rate: AtomicU32,
}

impl Shared {
    fn new() -> Self {
        Self {
            buffer: Mutex::new(SampleBuffer::new()),
            recording: AtomicBool::new(false),
            stop_flag: AtomicBool::new(false),
            sample_rate: AtomicU32::new(0),
        }
    }
}

/// Microphone backed by the host's default input device.
#[derive(Default)]
pub struct CpalDevice {
    current: Mutex<Option<Arc<Shared>>>,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

struct CpalStream {
    shared: Arc<Shared>,
}

impl AudioStream for CpalStream {
    fn stop_tracks(&self) {
        self.shared.recording.store(false, Ordering::SeqCst);
        self.shared.stop_flag.store(true, Ordering::SeqCst);
    }
}

struct CpalRecorder {
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<RecorderEvent>,
}

impl MediaRecorder for CpalRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.shared.stop_flag.load(Ordering::SeqCst) {
            return Err(CaptureError::Device("microphone stream already stopped".into()));
        }
        self.shared
            .buffer
            .lock()
            .map_err(|e| CaptureError::Device(e.to_string()))?
            .clear();
        self.shared.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.shared.recording.store(false, Ordering::SeqCst);
        let samples = self
            .shared
            .buffer
            .lock()
            .map_err(|e| CaptureError::Device(e.to_string()))?
            .take();
        let sample_rate = self.shared.sample_rate.load(Ordering::SeqCst);
        debug!("[recorder] {} samples at {} Hz", samples.len(), sample_rate);
        let bytes = encode_wav(&samples, sample_rate)?;
        self.events
            .send(RecorderEvent::Data(bytes))
            .map_err(|_| CaptureError::RecorderClosed)?;
        self.events
            .send(RecorderEvent::Stopped)
            .map_err(|_| CaptureError::RecorderClosed)?;
        Ok(())
    }

    fn mime_type(&self) -> String {
        WAV_MIME_TYPE.to_string()
    }
}

#[async_trait]
impl AudioDevice for CpalDevice {
    async fn request_stream(&self) -> Result<Box<dyn AudioStream>, CaptureError> {
        let shared = Arc::new(Shared::new());
        let (ready_tx, ready_rx) = oneshot::channel();
        let thread_shared = shared.clone();
        thread::spawn(move || run_capture(thread_shared, ready_tx));

        ready_rx
            .await
            .map_err(|_| CaptureError::Device("capture thread exited".into()))??;
        if let Ok(mut current) = self.current.lock() {
            *current = Some(shared.clone());
        }
        Ok(Box::new(CpalStream { shared }))
    }

    fn create_recorder(
        &self,
        _stream: &dyn AudioStream,
        mime_type: Option<&str>,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError> {
        if let Some(mime) = mime_type.filter(|m| *m != WAV_MIME_TYPE) {
            warn!("[recorder] cpal device only emits {}, not {}", WAV_MIME_TYPE, mime);
        }
        let shared = self
            .current
            .lock()
            .map_err(|e| CaptureError::Device(e.to_string()))?
            .clone()
            .ok_or_else(|| CaptureError::Device("no open microphone stream".into()))?;
        Ok(Box::new(CpalRecorder { shared, events }))
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type == WAV_MIME_TYPE
    }
}

fn run_capture(shared: Arc<Shared>, ready: oneshot::Sender<Result<(), CaptureError>>) {
    let stream = match open_input_stream(&shared) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready.send(Err(CaptureError::Device(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(()));

    while !shared.stop_flag.load(Ordering::SeqCst) {
        thread::sleep(STOP_POLL);
    }
    drop(stream);
    debug!("[recorder] microphone released");
}

fn open_input_stream(shared: &Arc<Shared>) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| CaptureError::Device("no default input device".into()))?;
    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?;
    let channels = supported.channels() as usize;
    shared
        .sample_rate
        .store(supported.sample_rate().0, Ordering::SeqCst);
    let config: cpal::StreamConfig = supported.config();
    let err_fn = |err: cpal::StreamError| warn!("[recorder] input stream error: {}", err);

    let data = shared.clone();
    let stream = match supported.sample_format() {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |samples: &[f32], _: &cpal::InputCallbackInfo| {
                if data.recording.load(Ordering::Relaxed) {
                    if let Ok(mut buffer) = data.buffer.lock() {
                        buffer.push_interleaved_f32(samples, channels);
                    }
                }
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |samples: &[i16], _: &cpal::InputCallbackInfo| {
                if data.recording.load(Ordering::Relaxed) {
                    if let Ok(mut buffer) = data.buffer.lock() {
                        buffer.push_interleaved_i16(samples, channels);
                    }
                }
            },
            err_fn,
            None,
        ),
        other => {
            return Err(CaptureError::Device(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| CaptureError::Device(e.to_string()))?;
    Ok(stream)
}

//! Scripted collaborators for unit tests.

use crate::audio::{AudioDevice, AudioOutput, AudioStream, Capture, MediaRecorder, RecorderEvent};
use crate::error::{CaptureError, StorageError};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::video::{PlayerState, VideoData, VideoPlayer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Load(String),
    Seek(f64),
    Play,
    Pause,
}

struct PlayerInner {
    calls: Vec<PlayerCall>,
    video: VideoData,
    current_time: f64,
    state: PlayerState,
    /// Polls of `player_state` still reporting buffering after a load.
    loading_polls: Option<usize>,
    state_polls: usize,
}

/// Player that records every command. After `load_video_by_id` it reports
/// `Buffering` for `load_polls` polls and then `Playing`, unless it pushes
/// state, in which case the test drives `set_state`.
pub struct FakePlayer {
    inner: Mutex<PlayerInner>,
    load_polls: usize,
    push: Option<watch::Sender<PlayerState>>,
}

impl FakePlayer {
    pub fn new(video_id: &str, title: &str) -> Self {
        Self {
            inner: Mutex::new(PlayerInner {
                calls: Vec::new(),
                video: VideoData {
                    title: title.to_string(),
                    video_id: video_id.to_string(),
                },
                current_time: 0.0,
                state: PlayerState::Paused,
                loading_polls: None,
                state_polls: 0,
            }),
            load_polls: 3,
            push: None,
        }
    }

    pub fn with_load_polls(mut self, polls: usize) -> Self {
        self.load_polls = polls;
        self
    }

    pub fn with_push(mut self) -> Self {
        let (tx, _rx) = watch::channel(PlayerState::Paused);
        self.push = Some(tx);
        self
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn pauses(&self) -> usize {
        self.calls().iter().filter(|c| **c == PlayerCall::Pause).count()
    }

    pub fn state_polls(&self) -> usize {
        self.inner.lock().unwrap().state_polls
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.inner.lock().unwrap().current_time = seconds;
    }

    pub fn set_state(&self, state: PlayerState) {
        self.inner.lock().unwrap().state = state;
        if let Some(tx) = &self.push {
            tx.send_replace(state);
        }
    }

    fn record(&self, call: PlayerCall) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

impl VideoPlayer for FakePlayer {
    fn load_video_by_id(&self, video_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(PlayerCall::Load(video_id.to_string()));
        inner.video = VideoData {
            title: format!("title of {video_id}"),
            video_id: video_id.to_string(),
        };
        inner.state = PlayerState::Unstarted;
        if self.push.is_none() {
            inner.loading_polls = Some(self.load_polls);
        }
        drop(inner);
        if let Some(tx) = &self.push {
            tx.send_replace(PlayerState::Unstarted);
        }
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().unwrap().current_time
    }

    fn seek_to(&self, seconds: f64) {
        self.record(PlayerCall::Seek(seconds));
    }

    fn play_video(&self) {
        self.record(PlayerCall::Play);
    }

    fn pause_video(&self) {
        self.record(PlayerCall::Pause);
    }

    fn video_data(&self) -> VideoData {
        self.inner.lock().unwrap().video.clone()
    }

    fn player_state(&self) -> PlayerState {
        let mut inner = self.inner.lock().unwrap();
        inner.state_polls += 1;
        match inner.loading_polls {
            Some(0) => {
                inner.loading_polls = None;
                inner.state = PlayerState::Playing;
            }
            Some(n) => {
                inner.loading_polls = Some(n - 1);
                inner.state = PlayerState::Buffering;
            }
            None => {}
        }
        inner.state
    }

    fn subscribe_state(&self) -> Option<watch::Receiver<PlayerState>> {
        self.push.as_ref().map(|tx| tx.subscribe())
    }
}

/// Shared counters a [`FakeDevice`] exposes to assertions.
#[derive(Default)]
pub struct DeviceLog {
    pub acquisitions: AtomicUsize,
    pub tracks_stopped: AtomicUsize,
    pub recorders_started: AtomicUsize,
}

/// How a [`FakeRecorder`] delivers its chunks once stopped.
#[derive(Debug, Clone, Copy)]
pub enum StopMode {
    /// Both chunks and `Stopped` are sent from inside `stop()`.
    Immediate,
    /// The first chunk is sent from `stop()`; the second chunk and
    /// `Stopped` follow from a spawned task after the delay.
    Delayed(Duration),
    /// The recorder drops its event sender instead of emitting anything.
    Hangup,
}

/// Microphone that hands out scripted recorders. Each recording yields two
/// chunks, `[n]` and `[n, n]`, where `n` counts recorder starts.
pub struct FakeDevice {
    pub log: Arc<DeviceLog>,
    supported: Vec<String>,
    deny: bool,
    fail_start: bool,
    stop_mode: StopMode,
}

impl FakeDevice {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            log: Arc::new(DeviceLog::default()),
            supported: supported.iter().map(|s| s.to_string()).collect(),
            deny: false,
            fail_start: false,
            stop_mode: StopMode::Immediate,
        }
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::new(&["audio/wav"])
        }
    }

    /// Recorders refuse to start, as a busy device would.
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn with_stop(mut self, mode: StopMode) -> Self {
        self.stop_mode = mode;
        self
    }
}

struct FakeStream {
    log: Arc<DeviceLog>,
}

impl AudioStream for FakeStream {
    fn stop_tracks(&self) {
        self.log.tracks_stopped.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeRecorder {
    log: Arc<DeviceLog>,
    events: Option<mpsc::UnboundedSender<RecorderEvent>>,
    recording: Option<u8>,
    fail_start: bool,
    stop_mode: StopMode,
}

impl MediaRecorder for FakeRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::Device("device busy".into()));
        }
        let n = self.log.recorders_started.fetch_add(1, Ordering::SeqCst) + 1;
        self.recording = Some(n as u8);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let n = self.recording.take().ok_or(CaptureError::RecorderClosed)?;
        match self.stop_mode {
            StopMode::Immediate => {
                if let Some(events) = &self.events {
                    let _ = events.send(RecorderEvent::Data(vec![n]));
                    let _ = events.send(RecorderEvent::Data(vec![n, n]));
                    let _ = events.send(RecorderEvent::Stopped);
                }
            }
            StopMode::Delayed(delay) => {
                if let Some(events) = self.events.clone() {
                    let _ = events.send(RecorderEvent::Data(vec![n]));
                    tokio::spawn(async move {
                        sleep(delay).await;
                        let _ = events.send(RecorderEvent::Data(vec![n, n]));
                        let _ = events.send(RecorderEvent::Stopped);
                    });
                }
            }
            StopMode::Hangup => {
                self.events = None;
            }
        }
        Ok(())
    }

    fn mime_type(&self) -> String {
        "audio/x-fake".to_string()
    }
}

#[async_trait]
impl AudioDevice for FakeDevice {
    async fn request_stream(&self) -> Result<Box<dyn AudioStream>, CaptureError> {
        tokio::task::yield_now().await;
        if self.deny {
            return Err(CaptureError::PermissionDenied("user dismissed prompt".into()));
        }
        self.log.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            log: self.log.clone(),
        }))
    }

    fn create_recorder(
        &self,
        _stream: &dyn AudioStream,
        _mime_type: Option<&str>,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> Result<Box<dyn MediaRecorder>, CaptureError> {
        Ok(Box::new(FakeRecorder {
            log: self.log.clone(),
            events: Some(events),
            recording: None,
            fail_start: self.fail_start,
            stop_mode: self.stop_mode,
        }))
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|s| s == mime_type)
    }
}

/// Output that records what was played and which captures were released.
#[derive(Default)]
pub struct FakeOutput {
    pub played: Mutex<Vec<(String, Vec<u8>)>>,
    pub released: Mutex<Vec<Uuid>>,
}

impl AudioOutput for FakeOutput {
    fn play(&self, capture: &Capture) -> Result<(), CaptureError> {
        self.played
            .lock()
            .unwrap()
            .push((capture.mime_type.clone(), capture.bytes.clone()));
        Ok(())
    }

    fn release(&self, capture_id: Uuid) {
        self.released.lock().unwrap().push(capture_id);
    }
}

/// Memory-backed store whose writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        Self {
            inner: MemoryStore::with_value(key, value),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.set(key, value)
    }
}

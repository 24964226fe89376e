//! Error types shared across the crate.

use thiserror::Error;

/// Durable storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Microphone, recorder and playback-of-capture failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("audio device error: {0}")]
    Device(String),
    #[error("recorder closed before emitting its stop event")]
    RecorderClosed,
    #[error("failed to play capture: {0}")]
    Playback(String),
    #[error("failed to encode capture: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while opening the on-disk session at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create app directories: {0}")]
    Directories(#[from] std::io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

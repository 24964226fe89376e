//! User-tunable settings, persisted as JSON next to the store.

use crate::audio::DEFAULT_CODEC_PREFERENCES;
use crate::error::SettingsError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Video loaded when nothing was watched before.
pub const DEFAULT_VIDEO_ID: &str = "M7lc1UVf-VE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interval for polling the player after a video switch.
    pub ready_poll_interval_ms: u64,
    /// Step used by the editor's +/- buttons.
    pub nudge_step_secs: f64,
    pub codec_preferences: Vec<String>,
    pub default_video_id: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ready_poll_interval_ms: 10,
            nudge_step_secs: 0.2,
            codec_preferences: DEFAULT_CODEC_PREFERENCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_video_id: DEFAULT_VIDEO_ID.to_string(),
            log_level: "debug".to_string(),
        }
    }
}

impl Settings {
    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    /// Parsed `log_level`, falling back to `Debug` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Debug)
    }
}

/// Load settings from `path`; a missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        debug!("[settings] {:?} not found, using defaults", path);
        return Ok(Settings::default());
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Startup variant of [`load_settings`]: a missing file is created with the
/// defaults so the user has something to edit.
pub fn load_or_init_settings(path: &Path) -> Result<Settings, SettingsError> {
    if path.exists() {
        return load_settings(path);
    }
    let settings = Settings::default();
    save_settings(path, &settings)?;
    info!("[settings] wrote defaults to {:?}", path);
    Ok(settings)
}

fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub mod audio;
pub mod clips;
pub mod error;
pub mod paths;
pub mod playback;
pub mod session;
pub mod settings;
pub mod storage;
pub mod time_format;
pub mod video;

#[cfg(test)]
mod test_support;

pub use clips::{Clip, ClipId, ClipStore};
pub use error::{CaptureError, SettingsError, StartupError, StorageError};
pub use session::{ClipEditor, Nudge, Session};
pub use settings::Settings;
pub use time_format::format_video_time;
pub use video::{parse_video_id, PlayerState, VideoData, VideoPlayer};

use audio::{AudioDevice, AudioOutput};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use storage::FileStore;

/// Install the global logger: stdout plus the app's log file.
pub fn init_logger(level: log::LevelFilter) -> Result<PathBuf, fern::InitError> {
    let log_file = paths::log_file_path()?;

    let format = |out: fern::FormatCallback<'_>, message: &std::fmt::Arguments<'_>, record: &log::Record| {
        out.finish(format_args!(
            "[{}][{}][{}][{:?}] {}",
            chrono::Local::now().format("%Y-%m-%d"),
            chrono::Local::now().format("%H:%M:%S"),
            record.target(),
            record.level(),
            message
        ))
    };

    fern::Dispatch::new()
        .format(format)
        .level(level)
        .chain(
            fern::Dispatch::new()
                .filter(|m| !m.target().starts_with("cpal"))
                .chain(std::io::stdout()),
        )
        .chain(fern::log_file(&log_file)?)
        .apply()?;

    Ok(log_file)
}

/// Open the on-disk session: settings and store under the app data dir,
/// logging installed at the configured level, clips hydrated. Returns the
/// session and the video the player should start on.
pub fn open_session(
    device: Arc<dyn AudioDevice>,
    output: Arc<dyn AudioOutput>,
) -> Result<(Session, String), StartupError> {
    paths::ensure_directories()?;
    let settings = settings::load_or_init_settings(&paths::settings_path())?;
    // A logger may already be installed by the host.
    let _log_path = init_logger(settings.level_filter()).ok();

    let store = FileStore::open(&paths::store_path())?;
    info!("[session] using store {:?}", store.path());
    let mut session = Session::new(settings, Arc::new(store), device, output);
    let video_id = session.hydrate();
    Ok((session, video_id))
}

//! Path utilities for the app data, settings, store and log files.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "speaking-practice";

/// Get the app data directory (e.g. ~/.local/share/speaking-practice on Linux).
/// Falls back to the working directory when the platform has none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

/// Get the path to the settings file.
pub fn settings_path() -> PathBuf {
    app_data_dir().join("settings.json")
}

/// Get the path to the key-value store holding clips and the last video.
pub fn store_path() -> PathBuf {
    app_data_dir().join("store.json")
}

/// Get the log file path, creating its directory if necessary.
pub fn log_file_path() -> Result<PathBuf, std::io::Error> {
    let dir = app_data_dir().join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(format!("{}.log", APP_DIR_NAME)))
}

/// Ensure all app directories exist.
pub fn ensure_directories() -> Result<(), std::io::Error> {
    std::fs::create_dir_all(app_data_dir())?;
    log_file_path()?;
    Ok(())
}

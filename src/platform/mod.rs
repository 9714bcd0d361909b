//! Where awesomebar keeps its files: `settings.json` in the config directory
//! and the history database in the data directory.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as os;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as os;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
use windows as os;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DATABASE_FILE_NAME: &str = "awesomebar.db";

/// Linux `$XDG_CONFIG_HOME/awesomebar`, macOS `~/Library/Application Support/Awesomebar`,
/// Windows `%APPDATA%/Awesomebar`.
pub fn get_config_dir() -> PathBuf {
    os::get_config_dir()
}

/// Linux `$XDG_DATA_HOME/awesomebar`; same as the config dir elsewhere.
pub fn get_data_dir() -> PathBuf {
    os::get_data_dir()
}

/// Default settings file used when no override is given.
pub fn settings_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE_NAME)
}

/// History database inside `data_dir`.
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join(DATABASE_FILE_NAME)
}

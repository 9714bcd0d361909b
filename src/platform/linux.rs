// Linux follows XDG: settings under the config home, the history database
// under the data home.

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/awesomebar` if set, otherwise `~/.config/awesomebar`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("awesomebar"),
        _ => home_dir().join(".config").join("awesomebar"),
    }
}

/// Uses `$XDG_DATA_HOME/awesomebar` if set, otherwise `~/.local/share/awesomebar`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("awesomebar"),
        _ => home_dir().join(".local").join("share").join("awesomebar"),
    }
}

// macOS keeps settings and the history database side by side.

use std::env;
use std::path::PathBuf;

fn app_support_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
    PathBuf::from(home).join("Library/Application Support/Awesomebar")
}

pub fn get_config_dir() -> PathBuf {
    app_support_dir()
}

pub fn get_data_dir() -> PathBuf {
    app_support_dir()
}

// Windows: roaming profile, so settings and history follow the user.

use std::env;
use std::path::PathBuf;

const FALLBACK_APPDATA: &str = "C:\\Users\\Default\\AppData\\Roaming";

fn roaming_dir() -> PathBuf {
    env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_APPDATA))
        .join("Awesomebar")
}

pub fn get_config_dir() -> PathBuf {
    roaming_dir()
}

pub fn get_data_dir() -> PathBuf {
    roaming_dir()
}

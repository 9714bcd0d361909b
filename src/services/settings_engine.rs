// Awesomebar Settings Engine
// Manages settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::services::suggestion_provider::validate_max_number_of_suggestions;
use crate::types::errors::SettingsError;
use crate::types::settings::AwesomebarSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AwesomebarSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AwesomebarSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: AwesomebarSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::settings_path().to_string_lossy().to_string(),
        };

        Self {
            config_path,
            settings: AwesomebarSettings::default(),
        }
    }

    /// Checks cross-field constraints serde cannot express.
    fn validate(settings: &AwesomebarSettings) -> Result<(), SettingsError> {
        validate_max_number_of_suggestions(settings.suggestions.max_number_of_suggestions)
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed or out of range, returns an error
    /// and keeps the current in-memory settings.
    fn load(&mut self) -> Result<AwesomebarSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = AwesomebarSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: AwesomebarSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&settings)?;

        tracing::debug!(path = %self.config_path, "loaded settings");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &AwesomebarSettings {
        &self.settings
    }

    /// Updates an individual setting by dot-notation key path and saves.
    ///
    /// The whole document is re-deserialized so type errors are caught.
    ///
    /// # Examples
    /// - `"suggestions.max_number_of_suggestions"`
    /// - `"suggestions.results_host_filter"`
    /// - `"history.record_history"`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let (last, path) = parts
                .split_last()
                .ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;
            let mut current = &mut json_value;
            for part in path {
                current = current.get_mut(*part).ok_or_else(|| {
                    SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
                })?;
            }
            match current {
                serde_json::Value::Object(map) => {
                    if !map.contains_key(*last) {
                        return Err(SettingsError::InvalidKey(format!(
                            "Key '{}' not found in settings",
                            key
                        )));
                    }
                    map.insert(last.to_string(), value);
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Cannot navigate to key '{}': intermediate value is not an object",
                        key
                    )));
                }
            }
        }

        let new_settings: AwesomebarSettings =
            serde_json::from_value(json_value).map_err(|e| {
                SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
            })?;
        Self::validate(&new_settings)?;

        self.settings = new_settings;
        self.save()?;

        Ok(())
    }

    /// Resets all settings to defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = AwesomebarSettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

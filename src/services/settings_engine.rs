// Linkshelf Settings Engine
// Loads and saves service settings as a JSON file and resolves where the
// database lives.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::errors::SettingsError;
use crate::types::settings::ServiceSettings;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "LINKSHELF_CONFIG";
/// Environment variable naming the directory for settings and data files.
pub const DATA_DIR_ENV: &str = "LINKSHELF_DATA_DIR";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServiceSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServiceSettings;
    fn set_settings(&mut self, settings: ServiceSettings) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ServiceSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise see [`resolve_config_path`].
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            resolve_config_path(
                env::var(CONFIG_ENV).ok().as_deref(),
                env::var(DATA_DIR_ENV).ok().as_deref(),
            )
            .to_string_lossy()
            .to_string()
        });

        Self {
            config_path,
            settings: ServiceSettings::default(),
        }
    }

    /// Resolves the database file from the loaded settings.
    ///
    /// Relative paths are placed under `LINKSHELF_DATA_DIR` when it is set.
    pub fn database_path(&self) -> PathBuf {
        resolve_data_path(
            &self.settings.database_path,
            env::var(DATA_DIR_ENV).ok().as_deref(),
        )
    }
}

/// Picks the settings file: an explicit `LINKSHELF_CONFIG` path, then
/// `settings.json` in the data directory, then `./settings.json`.
pub fn resolve_config_path(config_env: Option<&str>, data_dir: Option<&str>) -> PathBuf {
    match (
        config_env.filter(|p| !p.trim().is_empty()),
        data_dir.filter(|d| !d.trim().is_empty()),
    ) {
        (Some(explicit), _) => PathBuf::from(explicit),
        (None, Some(dir)) => Path::new(dir).join("settings.json"),
        (None, None) => PathBuf::from("settings.json"),
    }
}

/// Joins a relative `path` onto `data_dir`; absolute paths are kept.
pub fn resolve_data_path(path: &str, data_dir: Option<&str>) -> PathBuf {
    let path = Path::new(path);
    match data_dir.filter(|d| !d.trim().is_empty()) {
        Some(dir) if path.is_relative() => Path::new(dir).join(path),
        _ => path.to_path_buf(),
    }
}

fn validate(settings: &ServiceSettings) -> Result<(), SettingsError> {
    if settings.database_path.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "database_path cannot be empty".to_string(),
        ));
    }
    if settings.metadata.timeout_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "metadata.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if settings.export.filename_prefix.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "export.filename_prefix cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings. Missing fields
    /// take their defaults.
    fn load(&mut self) -> Result<ServiceSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = ServiceSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ServiceSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
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

    fn get_settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Validates and replaces the settings, then saves them to disk.
    fn set_settings(&mut self, settings: ServiceSettings) -> Result<(), SettingsError> {
        validate(&settings)?;
        self.settings = settings;
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}

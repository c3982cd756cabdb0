//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface:
//! default loading, persistence across instances, and validation.

use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::errors::SettingsError;
use linkshelf::types::settings::{ExportLayout, ServiceSettings};
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// Without a config file the service starts on defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, ServiceSettings::default());
    assert!(settings.metadata.enabled);
    assert_eq!(settings.export.layout, ExportLayout::Flat);
}

/// `set_settings` writes through, so a fresh engine reading the same file
/// sees the change.
#[test]
fn test_set_settings_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        let mut settings = engine.get_settings().clone();
        settings.export.layout = ExportLayout::Folders;
        settings.metadata.enabled = false;
        engine.set_settings(settings).unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let loaded = engine.load().unwrap();
    assert_eq!(loaded.export.layout, ExportLayout::Folders);
    assert!(!loaded.metadata.enabled);
}

/// Invalid settings are refused and the previous values stay in place.
#[test]
fn test_set_settings_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let mut bad = engine.get_settings().clone();
    bad.export.filename_prefix = "  ".to_string();
    let result = engine.set_settings(bad);

    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings(), &ServiceSettings::default());
    assert!(!dir.path().join("settings.json").exists());
}

/// A file that is not JSON is a serialization error, not a silent default.
#[test]
fn test_corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

    let mut engine = engine_in_temp(&dir);
    assert!(matches!(
        engine.load(),
        Err(SettingsError::SerializationError(_))
    ));
}

/// `save` creates missing parent directories.
#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b").join("settings.json");
    let engine = SettingsEngine::new(Some(nested.to_string_lossy().to_string()));

    engine.save().unwrap();

    assert!(nested.exists());
    assert_eq!(engine.get_config_path(), nested.to_string_lossy());
}

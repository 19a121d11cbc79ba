//! Configuration manager integration tests

use macmate_core::{Config, ConfigManager};
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let manager = ConfigManager::with_path(path.clone()).unwrap();
    assert_eq!(manager.config().provider.provider_type, "anthropic");
    assert_eq!(manager.config().limits.max_tool_calls, 5);
    assert!(!path.exists(), "loading must not create the file");
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut manager = ConfigManager::with_path(path.clone()).unwrap();
    manager.config_mut().provider.model = "gpt-4o".to_string();
    manager.config_mut().limits.max_tool_calls = 3;
    manager.config_mut().packages.max_search_results = 10;
    manager.save().unwrap();

    assert!(path.exists());

    let reloaded = ConfigManager::with_path(path).unwrap();
    assert_eq!(reloaded.config().provider.model, "gpt-4o");
    assert_eq!(reloaded.config().limits.max_tool_calls, 3);
    assert_eq!(reloaded.config().packages.max_search_results, 10);
    // Untouched sections keep their defaults
    assert_eq!(reloaded.config().general.log_level, "info");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not toml {{{{").unwrap();

    assert!(ConfigManager::with_path(path).is_err());
}

#[test]
fn test_api_key_presence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut manager = ConfigManager::with_path(path).unwrap();
    // No key configured and no env var for this fake provider type
    manager.config_mut().provider.provider_type = "nonexistent".to_string();
    manager.config_mut().provider.api_key_env = None;
    assert!(!manager.has_api_key());

    manager.set_api_key("sk-test".to_string());
    assert!(manager.has_api_key());
    assert_eq!(manager.get_api_key(), Some("sk-test".to_string()));
}

#[test]
fn test_default_config_serializes_cleanly() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();

    // API keys never serialize when unset
    assert!(!toml_str.contains("api_key ="));
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.packages.manager, "auto");
}

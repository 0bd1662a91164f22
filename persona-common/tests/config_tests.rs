//! Unit tests for configuration resolution
//!
//! Covers:
//! - Priority order: overrides > TOML > compiled defaults
//! - Missing default config file falls back to defaults
//! - Explicit missing config file is an error
//! - Zero branch timeout is rejected

use persona_common::config::{
    load_toml_config, ConfigOverrides, ServiceConfig, TomlConfig, DEFAULT_AGIFY_URL,
    DEFAULT_DATABASE_URL, DEFAULT_LISTEN,
};
use persona_common::Error;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults_when_nothing_configured() {
    let config = ServiceConfig::resolve(ConfigOverrides::default(), TomlConfig::default())
        .expect("defaults should resolve");

    assert_eq!(config.listen, DEFAULT_LISTEN);
    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(config.agify_url, DEFAULT_AGIFY_URL);
    assert_eq!(config.branch_timeout, Duration::from_secs(1));
    assert_eq!(config.db_timeout, Duration::from_secs(1));
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_toml_overrides_defaults() {
    let toml: TomlConfig = toml::from_str(
        r#"
        listen = "0.0.0.0:9000"
        branch_timeout_ms = 250

        [lookup]
        nationalize_url = "http://localhost:7003"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = ServiceConfig::resolve(ConfigOverrides::default(), toml).unwrap();

    assert_eq!(config.listen, "0.0.0.0:9000");
    assert_eq!(config.branch_timeout, Duration::from_millis(250));
    assert_eq!(config.nationalize_url, "http://localhost:7003");
    assert_eq!(config.agify_url, DEFAULT_AGIFY_URL);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_overrides_take_precedence_over_toml() {
    let toml: TomlConfig = toml::from_str(
        r#"
        listen = "0.0.0.0:9000"
        branch_timeout_ms = 250
        "#,
    )
    .unwrap();

    let overrides = ConfigOverrides {
        listen: Some("127.0.0.1:9100".to_string()),
        branch_timeout_ms: Some(750),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(overrides, toml).unwrap();

    assert_eq!(config.listen, "127.0.0.1:9100");
    assert_eq!(config.branch_timeout, Duration::from_millis(750));
}

#[test]
fn test_blank_override_ignored() {
    let overrides = ConfigOverrides {
        database_url: Some("   ".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(overrides, TomlConfig::default()).unwrap();
    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
}

#[test]
fn test_zero_branch_timeout_rejected() {
    let overrides = ConfigOverrides {
        branch_timeout_ms: Some(0),
        ..Default::default()
    };

    let result = ServiceConfig::resolve(overrides, TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_explicit_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("persona.toml");
    std::fs::write(
        &path,
        r#"
        database_url = "sqlite::memory:"
        db_timeout_ms = 300
        "#,
    )
    .unwrap();

    let loaded = load_toml_config(Some(&path)).expect("config should load");
    assert_eq!(loaded.source.as_deref(), Some(path.as_path()));

    let toml = loaded.config;
    assert_eq!(toml.database_url.as_deref(), Some("sqlite::memory:"));
    assert_eq!(toml.db_timeout_ms, Some(300));
    assert_eq!(toml.logging.level, "info");
}

#[test]
fn test_load_explicit_missing_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let result = load_toml_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_malformed_toml_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "listen = [unterminated").unwrap();

    let result = load_toml_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

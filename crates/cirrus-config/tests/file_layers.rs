//! Loading from real files on disk.

use std::fs;

use cirrus_config::{ConfigError, ConfigLoader};
use cirrus_telemetry::LogFormat;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "cirrus.toml",
        r#"
            [app]
            name = "orders"
            debug = true

            [logging]
            level = "warn"
            format = "compact"

            [metrics]
            duration_buckets = [0.01, 0.1, 1.0]
        "#,
    );

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert_eq!(config.app.name, "orders");
    assert!(config.app.debug);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(config.metrics.duration_buckets, [0.01, 0.1, 1.0]);
}

#[test]
fn test_json_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cirrus.json", r#"{"app": {"name": "billing"}}"#);

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert_eq!(config.app.name, "billing");
    assert!(config.logging.enabled);
}

#[test]
fn test_unknown_field_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cirrus.toml", "[app]\nname = \"x\"\nport = 8080\n");

    let result = ConfigLoader::new().with_file(&path);
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cirrus.yaml", "app:\n  name: x\n");

    let result = ConfigLoader::new().with_file(&path);
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
}

#[test]
fn test_file_then_env_file() {
    let dir = TempDir::new().unwrap();
    let config_path = write(&dir, "cirrus.toml", "[app]\nname = \"orders\"\n");
    let env_path = write(
        &dir,
        "test.env",
        "CIRRUS_FILE_LAYERS__APP__DEBUG=true\nCIRRUS_FILE_LAYERS__LOGGING__LEVEL=debug\n",
    );

    let config = ConfigLoader::new()
        .with_file(&config_path)
        .unwrap()
        .with_env_file(&env_path)
        .unwrap()
        .with_env_prefix("CIRRUS_FILE_LAYERS")
        .load()
        .unwrap();

    assert_eq!(config.app.name, "orders");
    assert!(config.app.debug);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_env_file_bad_value() {
    let dir = TempDir::new().unwrap();
    let env_path = write(&dir, "bad.env", "CIRRUS_FILE_BAD__APP__DEBUG=sometimes\n");

    let result = ConfigLoader::new()
        .with_env_file(&env_path)
        .unwrap()
        .with_env_prefix("CIRRUS_FILE_BAD")
        .load();
    assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
}

#[test]
fn test_missing_env_file() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::new().with_env_file(dir.path().join("absent.env"));
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cirrus.toml", "[metrics]\nduration_buckets = []\n");

    let result = ConfigLoader::new().with_file(&path).unwrap().load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

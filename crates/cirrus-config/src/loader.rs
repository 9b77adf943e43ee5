//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, `.env` files and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use cirrus_telemetry::LogFormat;

use crate::{CirrusConfig, ConfigError};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values or a preset
/// 2. Configuration file or string (TOML or JSON), replacing the whole config
/// 3. Variables from `.env` files
/// 4. Process environment variables
///
/// Layers 3 and 4 only apply when a prefix is set, and only to variables
/// named `PREFIX__SECTION__KEY`.
///
/// # Example
///
/// ```no_run
/// use cirrus_config::ConfigLoader;
///
/// # fn main() -> Result<(), cirrus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("cirrus.toml")?
///     .with_dotenv()?
///     .with_env_prefix("CIRRUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CirrusConfig,
    env_prefix: Option<String>,
    env_vars: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CirrusConfig::default(),
            env_prefix: None,
            env_vars: Vec::new(),
        }
    }

    /// Start with default configuration values.
    ///
    /// This is what `new()` starts from, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = CirrusConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use cirrus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.app.debug);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CirrusConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CirrusConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is determined by the extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is not supported
    /// - The file contains invalid TOML/JSON or unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// `format` is `"toml"` or `"json"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use cirrus_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [app]
    ///     name = "orders"
    ///     debug = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.app.name, "orders");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `CIRRUS__APP__DEBUG=true` or `CIRRUS__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Read variables from `.env` in the working directory, if present.
    ///
    /// The process environment is left untouched; the variables only feed
    /// this loader's overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let path = Path::new(".env");
        if path.exists() {
            self.with_env_file(path)
        } else {
            Ok(self)
        }
    }

    /// Read variables from a `.env`-style file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn with_env_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        for item in dotenvy::from_path_iter(path)? {
            self.env_vars.push(item?);
        }
        Ok(self)
    }

    /// Adds override variables explicitly.
    ///
    /// They are applied like `.env` variables: after the file layers and
    /// before the process environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment overrides (if a prefix was set) and validates
    /// the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the
    /// configuration fails validation.
    pub fn load(self) -> Result<CirrusConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Finalize without validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed.
    pub fn load_unvalidated(mut self) -> Result<CirrusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let file_vars = std::mem::take(&mut self.env_vars);
            for (key, value) in file_vars.into_iter().chain(env::vars()) {
                if key.starts_with(&prefix) {
                    self.apply_env_var(&key, &value, &prefix)?;
                }
            }
        }
        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<CirrusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Shares the prefix but is not ours, e.g. CIRRUSX__APP__NAME.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["APP", "NAME"] => {
                self.config.app.name = value.to_string();
            }
            ["APP", "DEBUG"] => {
                self.config.app.debug = parse_bool(key, value)?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(key, value)?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'pretty' or 'compact'",
                        ))
                    }
                };
            }
            ["LOGGING", "SPAN_EVENTS"] => {
                self.config.logging.span_events = parse_bool(key, value)?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(key, value)?;
            }

            ["METRICS", "ENABLED"] => {
                self.config.metrics.enabled = parse_bool(key, value)?;
            }
            ["METRICS", "DURATION_BUCKETS"] => {
                self.config.metrics.duration_buckets = value
                    .split(',')
                    .map(|b| b.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| {
                        ConfigError::env_parse_error(key, "expected comma-separated floats")
                    })?;
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, CirrusConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.app.debug);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"app": {"name": "billing"}, "metrics": {"enabled": false}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.app.name, "billing");
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("name: x", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/cirrus.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/cirrus.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.app.name, "cirrus");
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "True", "1", "yes", "on"] {
            assert!(parse_bool("K", value).unwrap());
        }
        for value in ["false", "FALSE", "0", "no", "off"] {
            assert!(!parse_bool("K", value).unwrap());
        }
        assert!(parse_bool("K", "maybe").is_err());
        assert!(parse_bool("K", "").is_err());
    }

    #[test]
    fn test_apply_env_var_app() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__APP__NAME", "orders", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__APP__DEBUG", "yes", "TEST")
            .unwrap();
        assert_eq!(loader.config.app.name, "orders");
        assert!(loader.config.app.debug);
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "compact", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__LEVEL", "warn", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.format, LogFormat::Compact);
        assert_eq!(loader.config.logging.level, "warn");

        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_buckets() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__METRICS__DURATION_BUCKETS", "0.01, 0.1,1", "TEST")
            .unwrap();
        assert_eq!(loader.config.metrics.duration_buckets, [0.01, 0.1, 1.0]);

        assert!(loader
            .apply_env_var("TEST__METRICS__DURATION_BUCKETS", "fast,slow", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_foreign_keys() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TESTING__APP__NAME", "other", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__SERVER__PORT", "80", "TEST")
            .unwrap();
        assert_eq!(loader.config.app.name, "cirrus");
    }

    #[test]
    fn test_env_vars_need_prefix() {
        let config = ConfigLoader::new()
            .with_env_vars([("CIRRUS_TEST_LOADER__APP__NAME", "ignored")])
            .load()
            .unwrap();
        assert_eq!(config.app.name, "cirrus");

        let config = ConfigLoader::new()
            .with_env_vars([("CIRRUS_TEST_LOADER__APP__NAME", "applied")])
            .with_env_prefix("cirrus_test_loader")
            .load()
            .unwrap();
        assert_eq!(config.app.name, "applied");
    }

    #[test]
    fn test_overrides_are_validated() {
        let result = ConfigLoader::new()
            .with_env_vars([("CIRRUS_TEST_VALIDATE__APP__NAME", "")])
            .with_env_prefix("CIRRUS_TEST_VALIDATE")
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}

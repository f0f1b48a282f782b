//! Configuration management for codescout.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `codescout.toml` file
//! 3. User config `~/.config/codescout/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory walk and file selection settings.
    pub extraction: ExtractionConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./codescout.toml` (project local)
    /// 2. `~/.config/codescout/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides apply in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Path of the per-user config file, when a config dir exists.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_USER_CONFIG_FILE))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let extraction = &mut self.extraction;
        if let Some(value) = lookup(ENV_RECURSIVE) {
            extraction.recursive = parse_bool(ENV_RECURSIVE, &value)?;
        }
        if let Some(value) = lookup(ENV_INCLUDE_HIDDEN) {
            extraction.include_hidden = parse_bool(ENV_INCLUDE_HIDDEN, &value)?;
        }
        if let Some(value) = lookup(ENV_RESPECT_GITIGNORE) {
            extraction.respect_gitignore = parse_bool(ENV_RESPECT_GITIGNORE, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_FILE_SIZE) {
            extraction.max_file_size = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a byte count, got '{}'", ENV_MAX_FILE_SIZE, value))
            })?;
        }
        if let Some(value) = lookup(ENV_EXTENSIONS) {
            extraction.extensions = split_extensions(&value);
        }

        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Directory walk and file selection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Walk into subdirectories.
    pub recursive: bool,

    /// Include hidden files and directories.
    pub include_hidden: bool,

    /// Honor `.gitignore` and related ignore files.
    pub respect_gitignore: bool,

    /// Skip files larger than this many bytes during directory walks.
    pub max_file_size: u64,

    /// Extensions to extract from (without leading dot). Empty means every
    /// supported extension.
    pub extensions: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            recursive: DEFAULT_RECURSIVE,
            include_hidden: DEFAULT_INCLUDE_HIDDEN,
            respect_gitignore: DEFAULT_RESPECT_GITIGNORE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            extensions: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"warn"` or `"codescout_core=debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

/// Split a comma-separated extension list, dropping leading dots and blanks.
pub fn split_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.extraction.recursive);
        assert!(!config.extraction.include_hidden);
        assert!(config.extraction.respect_gitignore);
        assert_eq!(config.extraction.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(config.extraction.extensions.is_empty());
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[extraction]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("respect_gitignore = true"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[extraction]
recursive = true
max_file_size = 2048
extensions = ["py", "rs"]

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.extraction.recursive);
        assert!(config.extraction.respect_gitignore);
        assert_eq!(config.extraction.max_file_size, 2048);
        assert_eq!(config.extraction.extensions, vec!["py", "rs"]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_overrides() {
        let vars = env(&[
            (ENV_RECURSIVE, "yes"),
            (ENV_RESPECT_GITIGNORE, "0"),
            (ENV_MAX_FILE_SIZE, "4096"),
            (ENV_EXTENSIONS, ".PY, rs,,"),
            (ENV_LOG, "trace"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned()).unwrap();

        assert!(config.extraction.recursive);
        assert!(!config.extraction.include_hidden);
        assert!(!config.extraction.respect_gitignore);
        assert_eq!(config.extraction.max_file_size, 4096);
        assert_eq!(config.extraction.extensions, vec!["py", "rs"]);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_invalid_overrides() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == ENV_RECURSIVE).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains(ENV_RECURSIVE));

        let err = config
            .apply_overrides(|key| (key == ENV_MAX_FILE_SIZE).then(|| "big".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

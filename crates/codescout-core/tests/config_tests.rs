use codescout_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_MAX_FILE_SIZE};
use codescout_core::{Config, ConfigError};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.extraction.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert_eq!(config.extraction.max_file_size, 1024 * 1024);
    assert!(config.extraction.respect_gitignore);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(
        &path,
        "[extraction]\ninclude_hidden = true\nextensions = [\"kt\"]\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.extraction.include_hidden);
    assert!(!config.extraction.recursive);
    assert_eq!(config.extraction.extensions, vec!["kt"]);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_from_file_errors() {
    let dir = TempDir::new().unwrap();

    let missing = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::ReadError(_)));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[extraction\nrecursive = ").unwrap();
    let err = Config::from_file(&bad).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    assert!(err.to_string().starts_with("Failed to parse config file"));

    let wrong_type = dir.path().join("wrong.toml");
    std::fs::write(&wrong_type, "[extraction]\nrecursive = \"sometimes\"\n").unwrap();
    assert!(matches!(
        Config::from_file(&wrong_type),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_default_config_string_round_trips() {
    let rendered = Config::default_config_string();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, Config::default());
}

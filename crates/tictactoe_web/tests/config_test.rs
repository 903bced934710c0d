//! Tests for loading server configuration from disk.

use std::io::Write;
use tictactoe_web::ServerConfig;

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "host = \"0.0.0.0\"\nport = 8123").unwrap();

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8123);
    assert_eq!(config.cookie_name(), "ttt_session");
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServerConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_invalid_toml_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = ServerConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_default_config_written_and_reloaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = ServerConfig::default().to_toml().unwrap();
    file.write_all(text.as_bytes()).unwrap();

    assert_eq!(ServerConfig::from_file(file.path()).unwrap(), ServerConfig::default());
}

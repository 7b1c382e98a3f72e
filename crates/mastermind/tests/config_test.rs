//! Tests for configuration loading.

use mastermind::{GameConfig, SecretSource};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = GameConfig::default();
    assert_eq!(config.db_path(), "mastermind.db");
    assert_eq!(*config.secret_source(), SecretSource::Local);
    assert_eq!(
        config.random_org_base_url(),
        "https://www.random.org/integers/"
    );
    assert_eq!(*config.time_limit_secs(), 60);
}

#[test]
fn test_empty_toml_takes_defaults() {
    let config = GameConfig::from_toml("").expect("Parse failed");
    assert_eq!(config.db_path(), "mastermind.db");
    assert_eq!(*config.time_limit_secs(), 60);
}

#[test]
fn test_toml_overrides() {
    let config = GameConfig::from_toml(
        r#"
db_path = "/tmp/games.db"
secret_source = "random_org"
random_org_base_url = "http://localhost:8000/integers/"
time_limit_secs = 45
"#,
    )
    .expect("Parse failed");

    assert_eq!(config.db_path(), "/tmp/games.db");
    assert_eq!(*config.secret_source(), SecretSource::RandomOrg);
    assert_eq!(
        config.random_org_base_url(),
        "http://localhost:8000/integers/"
    );
    assert_eq!(*config.time_limit_secs(), 45);
}

#[test]
fn test_invalid_toml_rejected() {
    assert!(GameConfig::from_toml("time_limit_secs = \"soon\"").is_err());
    assert!(GameConfig::from_toml("secret_source = \"dice\"").is_err());
    assert!(GameConfig::from_toml("db_path = ").is_err());
}

#[test]
fn test_zero_time_limit_rejected() {
    let err = GameConfig::from_toml("time_limit_secs = 0").expect_err("Parse should fail");
    assert!(err.message.contains("time_limit_secs"));
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "time_limit_secs = 30").expect("Write failed");

    let config = GameConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(*config.time_limit_secs(), 30);
    assert_eq!(*config.secret_source(), SecretSource::Local);
}

#[test]
fn test_missing_file_rejected() {
    assert!(GameConfig::from_file("/nonexistent/mastermind.toml").is_err());
}

#[test]
fn test_db_path_override() {
    let config = GameConfig::default().with_db_path("other.db");
    assert_eq!(config.db_path(), "other.db");
}

//! Configuration loading tests
//!
//! Covers:
//! - Partial TOML files fall back to defaults per field
//! - Explicitly named config files must exist and parse
//! - Environment secrets take priority over TOML
//! - CLI overrides beat everything
//!
//! Tests touching OPENAI_API_KEY / MOCHI_API_KEY / MCG_CONFIG are marked
//! #[serial] so they do not race on process environment.

use mcg_common::config::{
    load_toml_config, parse_toml_config, ConfigOverrides, ServiceConfig, CONFIG_ENV_VAR,
    MOCHI_API_KEY_ENV, OPENAI_API_KEY_ENV,
};
use mcg_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

fn clear_env() {
    env::remove_var(OPENAI_API_KEY_ENV);
    env::remove_var(MOCHI_API_KEY_ENV);
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_partial_toml_uses_defaults_for_missing_fields() {
    let config = parse_toml_config(
        r#"
        [server]
        port = 9100

        [generation]
        retry_delay_ms = 500
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.generation.retry_delay_ms, 500);
    assert_eq!(config.generation.max_attempts, 3);
    assert_eq!(config.generation.min_note_chars, 50);
    assert_eq!(config.openai.model, "gpt-4o");
}

#[test]
fn test_empty_toml_is_all_defaults() {
    let config = parse_toml_config("").unwrap();
    assert_eq!(config.server.port, 8000);
    assert!(config.openai.api_key.is_none());
    assert!(config.logging.file.is_none());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = parse_toml_config("[server\nport = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let result = load_toml_config(Some(std::path::Path::new(
        "/nonexistent/mochi-cardgen/config.toml",
    )));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_explicit_file_is_loaded() {
    let file = write_config(
        r#"
        [openai]
        model = "gpt-4o-mini"
        json_mode = false

        [logging]
        level = "debug"
        file = "/tmp/mcg.log"
        "#,
    );

    let config = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert!(!config.openai.json_mode);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/mcg.log"))
    );
}

#[test]
#[serial]
fn test_environment_secret_beats_toml() {
    clear_env();
    let file = write_config(
        r#"
        [openai]
        api_key = "toml-openai"

        [mochi]
        api_key = "toml-mochi"
        "#,
    );
    env::set_var(OPENAI_API_KEY_ENV, "env-openai");

    let config = ServiceConfig::load(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.openai.api_key.as_deref(), Some("env-openai"));
    assert_eq!(config.mochi.api_key.as_deref(), Some("toml-mochi"));
    clear_env();
}

#[test]
#[serial]
fn test_missing_secrets_are_not_a_startup_error() {
    clear_env();
    let file = write_config("");

    let config = ServiceConfig::load(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap();

    assert!(config.openai.api_key.is_none());
    assert!(config.mochi.api_key.is_none());
}

#[test]
#[serial]
fn test_config_path_from_environment() {
    clear_env();
    let file = write_config("[server]\nport = 8123\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = ServiceConfig::load(ConfigOverrides::default()).unwrap();
    assert_eq!(config.server.port, 8123);
    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_beat_toml() {
    clear_env();
    let file = write_config("[server]\nhost = \"0.0.0.0\"\nport = 8123\n");

    let config = ServiceConfig::load(ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        host: None,
        port: Some(9999),
        log_level: Some("warn".into()),
    })
    .unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:9999");
    assert_eq!(config.logging.level, "warn");
}

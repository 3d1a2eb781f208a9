//! Tests for loading simulator configuration.

use std::io::Write;
use std::time::Duration;
use strictly_sim::{ENGINE_URL_ENV, SimulatorConfig, StrategyKind};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
engine_url = "http://engine.local:3001"
default_strategy = "ai"
request_timeout_ms = 2500
simulation_timeout_ms = 0
enabled_strategies = ["ai", "rule_based"]
"#,
    );

    let config = SimulatorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8080);
    assert_eq!(config.engine_url().as_deref(), Some("http://engine.local:3001"));
    assert_eq!(*config.default_strategy(), StrategyKind::Ai);
    assert_eq!(config.request_timeout(), Duration::from_millis(2500));
    assert_eq!(config.simulation_timeout(), None);
    assert_eq!(config.enabled_strategies(), &[StrategyKind::Ai, StrategyKind::RuleBased]);
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
}

#[test]
fn test_partial_config_uses_defaults() {
    let file = write_config("port = 4000\n");
    let config = SimulatorConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.port(), 4000);
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(config.engine_url(), &None);
    assert_eq!(*config.default_strategy(), StrategyKind::Random);
    assert_eq!(config.enabled_strategies().len(), 3);
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let file = write_config("default_strategy = \"grandmaster\"\n");
    let err = SimulatorConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_default_strategy_must_be_enabled() {
    let file = write_config("default_strategy = \"ai\"\nenabled_strategies = [\"random\"]\n");
    let err = SimulatorConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("default_strategy"));
}

#[test]
fn test_zero_request_timeout_is_rejected() {
    let file = write_config("request_timeout_ms = 0\n");
    assert!(SimulatorConfig::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_is_an_error_but_load_or_default_is_not() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = SimulatorConfig::from_file(&path).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
    assert!(err.file.ends_with("config.rs"));

    let config = SimulatorConfig::load_or_default(&path).unwrap();
    assert_eq!(config, SimulatorConfig::default());
}

#[test]
fn test_overrides_layer_over_file() {
    let file = write_config("engine_url = \"http://from-file\"\nport = 3100\n");
    let config = SimulatorConfig::from_file(file.path())
        .unwrap()
        .apply_overrides(|key| (key == ENGINE_URL_ENV).then(|| "http://from-env".to_string()))
        .unwrap()
        .with_port(3200);

    assert_eq!(config.engine_url().as_deref(), Some("http://from-env"));
    assert_eq!(*config.port(), 3200);
}

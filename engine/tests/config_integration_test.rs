//! Integration tests for configuration loading

use std::fs;
use std::path::PathBuf;
use sweepd_engine::config::{Config, WindowAnchor};
use tempfile::TempDir;

fn write_config(temp_dir: &TempDir, contents: &str) -> PathBuf {
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

const FULL_CONFIG: &str = r#"
[core]
log_level = "debug"

[grouping]
window_ms = 1500
anchor = "last_request"

[device]
base_url = "http://homeassistant.local:8123"
token = "long-lived-token"
entity_id = "vacuum.x40_ultra_complete"
service_domain = "dreame_vacuum"
stop_timeout_secs = 20
ack_timeout_secs = 8

[intake]
listen = "127.0.0.1:9000"

[zones.kitchen]
name = "Kitchen"
segments = [3]
cleaning_mode = "sweeping_and_mopping"

[zones.hallway]
segments = [2, 5]
"#;

#[test]
fn full_config_loads_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, FULL_CONFIG);

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.grouping.window_ms, 1500);
    assert_eq!(config.grouping.anchor, WindowAnchor::LastRequest);
    assert_eq!(config.device.entity_id, "vacuum.x40_ultra_complete");
    assert_eq!(config.device.stop_timeout_secs, 20);
    assert_eq!(config.intake.listen, "127.0.0.1:9000");
    assert_eq!(config.zones.len(), 2);
    assert_eq!(config.zones["hallway"].segments, vec![2, 5]);
}

#[test]
fn missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nope.toml");

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn invalid_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "zones = \"not a table");

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn validation_runs_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
[device]
test_mode = true

[zones.kitchen]
segments = []
"#,
    );

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("has no segments"));
}

#[test]
fn config_round_trips_through_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, FULL_CONFIG);
    let config = Config::load_from_path(&path).unwrap();

    let serialized = toml::to_string(&config).unwrap();
    let reparsed: Config = toml::from_str(&serialized).unwrap();
    reparsed.validate().unwrap();

    assert_eq!(reparsed.grouping.window_ms, config.grouping.window_ms);
    assert_eq!(reparsed.grouping.anchor, config.grouping.anchor);
    assert_eq!(reparsed.device.entity_id, config.device.entity_id);
    assert_eq!(
        reparsed.zones["kitchen"].cleaning_mode,
        config.zones["kitchen"].cleaning_mode
    );
    assert_eq!(
        reparsed.zones["hallway"].segments,
        config.zones["hallway"].segments
    );
}

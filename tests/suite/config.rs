//! Config files feeding the runtime defaults.

use std::io::Write;
use std::time::Duration;

use timeable_config::{ConfigError, TimeableConfig};
use timeable_core::poll::DEFAULT_POLL_INTERVAL;

#[test]
fn full_file_round_trips_into_options() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[poll]
interval_ms = 500
immediately = true
immediate_delay_ms = 1

[wait]
interval_ms = 100
timeout_ms = 900

[batch]
concurrency = "2"
"#
    )
    .unwrap();

    let config = TimeableConfig::from_path(file.path()).unwrap();
    let poll = config.poll_options();
    assert_eq!(poll.interval, Duration::from_millis(500));
    assert!(poll.immediately);
    assert_eq!(poll.immediate_delay, Duration::from_millis(1));
    assert_eq!(config.wait_interval(), Duration::from_millis(100));
    assert_eq!(config.wait_timeout(), Duration::from_millis(900));
    assert_eq!(config.concurrency(), 2);
}

#[test]
fn partial_file_keeps_defaults_elsewhere() {
    let config = TimeableConfig::parse("[wait]\ntimeout_ms = 10\n").unwrap();
    assert_eq!(config.poll_options().interval, DEFAULT_POLL_INTERVAL);
    assert!(!config.poll_options().immediately);
    assert_eq!(config.wait_timeout(), Duration::from_millis(10));
    assert_eq!(config.concurrency(), 0);
}

#[test]
fn wrong_types_are_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[poll]\ninterval_ms = \"soon\"\n").unwrap();

    let err = TimeableConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), path);
}

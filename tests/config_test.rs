/*!
 * Queue Configuration Tests
 * Environment and JSON loading
 */

use limited_queue::queue::{ENV_ALLOW_DROP, ENV_LIMIT, ENV_TIMEOUT_US};
use limited_queue::{ConfigError, LimitedQueue, OverflowPolicy, QueueConfig};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::time::Duration;

fn clear_env() {
    for var in [ENV_LIMIT, ENV_ALLOW_DROP, ENV_TIMEOUT_US] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    clear_env();
    assert_eq!(QueueConfig::from_env().unwrap(), QueueConfig::default());
}

#[test]
#[serial]
fn test_from_env_reads_all_settings() {
    clear_env();
    std::env::set_var(ENV_LIMIT, "10");
    std::env::set_var(ENV_ALLOW_DROP, "false");
    std::env::set_var(ENV_TIMEOUT_US, " 1000 ");

    let config = QueueConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.limit, 10);
    assert_eq!(config.policy, OverflowPolicy::Block);
    assert_eq!(config.timeout, Duration::from_micros(1000));

    let queue = LimitedQueue::<u8>::with_config(config);
    assert_eq!(queue.timeout(), Duration::from_micros(1000));
}

#[test]
#[serial]
fn test_from_env_rejects_malformed_value() {
    clear_env();
    std::env::set_var(ENV_LIMIT, "ten");

    let err = QueueConfig::from_env().unwrap_err();
    clear_env();

    match err {
        ConfigError::Env { var, value } => {
            assert_eq!(var, ENV_LIMIT);
            assert_eq!(value, "ten");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_json_round_trip() {
    let config = QueueConfig::lossless(32, Duration::from_micros(2500));
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"timeout_us\":2500"));
    assert_eq!(QueueConfig::from_json(&json).unwrap(), config);
}

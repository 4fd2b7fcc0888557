/*!
 * Queue Configuration
 *
 * Construction-time settings: capacity, overflow policy and wait timeout
 */

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMicroSeconds};
use std::time::Duration;

/// Environment variable holding the capacity limit (0 = unbounded)
pub const ENV_LIMIT: &str = "LIMITED_QUEUE_LIMIT";
/// Environment variable selecting drop mode (true/false/1/0)
pub const ENV_ALLOW_DROP: &str = "LIMITED_QUEUE_ALLOW_DROP";
/// Environment variable holding the wait timeout in microseconds (0 = forever)
pub const ENV_TIMEOUT_US: &str = "LIMITED_QUEUE_TIMEOUT_US";

/// What a producer does when the queue is at capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest element to make room; never blocks
    #[default]
    DropOldest,
    /// Wait for a consumer to free a slot, bounded by the queue timeout
    Block,
}

impl OverflowPolicy {
    /// Map the `allow_drop` flag onto a policy
    pub const fn from_allow_drop(allow_drop: bool) -> Self {
        if allow_drop {
            Self::DropOldest
        } else {
            Self::Block
        }
    }

    pub const fn allows_drop(self) -> bool {
        matches!(self, Self::DropOldest)
    }
}

/// Queue configuration
///
/// `limit == 0` means unbounded and a zero `timeout` means waits never
/// expire. Both apply to producers and consumers alike.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum buffered elements, 0 for unbounded
    #[serde(default)]
    pub limit: usize,
    /// Overflow behavior once `limit` is reached
    #[serde(default)]
    pub policy: OverflowPolicy,
    /// Wait timeout for blocked pushes and pops
    #[serde_as(as = "DurationMicroSeconds<u64>")]
    #[serde(rename = "timeout_us", default)]
    pub timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            policy: OverflowPolicy::DropOldest,
            timeout: Duration::ZERO,
        }
    }
}

impl QueueConfig {
    pub const fn new(limit: usize, allow_drop: bool, timeout: Duration) -> Self {
        Self {
            limit,
            policy: OverflowPolicy::from_allow_drop(allow_drop),
            timeout,
        }
    }

    /// Bounded queue that discards the oldest element when full
    pub const fn lossy(limit: usize) -> Self {
        Self::new(limit, true, Duration::ZERO)
    }

    /// Bounded queue whose producers wait up to `timeout` for space
    pub const fn lossless(limit: usize, timeout: Duration) -> Self {
        Self::new(limit, false, timeout)
    }

    /// Parse a JSON document such as
    /// `{"limit": 64, "policy": "block", "timeout_us": 1000}`
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read configuration from the `LIMITED_QUEUE_*` environment variables
    ///
    /// Unset variables keep their default; malformed values are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(limit) = read_env(ENV_LIMIT, |v| v.parse::<usize>().ok())? {
            config.limit = limit;
        }
        if let Some(allow_drop) = read_env(ENV_ALLOW_DROP, parse_flag)? {
            config.policy = OverflowPolicy::from_allow_drop(allow_drop);
        }
        if let Some(micros) = read_env(ENV_TIMEOUT_US, |v| v.parse::<u64>().ok())? {
            config.timeout = Duration::from_micros(micros);
        }

        Ok(config)
    }

    pub const fn is_bounded(&self) -> bool {
        self.limit > 0
    }

    /// Wait bound for blocking calls, `None` when waits never expire
    pub fn wait_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}

fn read_env<T>(
    var: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::Env { var, value }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_drop_no_timeout() {
        let config = QueueConfig::default();
        assert!(!config.is_bounded());
        assert_eq!(config.policy, OverflowPolicy::DropOldest);
        assert_eq!(config.wait_timeout(), None);
    }

    #[test]
    fn test_presets() {
        let lossy = QueueConfig::lossy(8);
        assert_eq!(lossy.limit, 8);
        assert!(lossy.policy.allows_drop());

        let lossless = QueueConfig::lossless(4, Duration::from_millis(5));
        assert_eq!(lossless.policy, OverflowPolicy::Block);
        assert_eq!(lossless.wait_timeout(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_from_json() {
        let config =
            QueueConfig::from_json(r#"{"limit": 64, "policy": "block", "timeout_us": 1000}"#)
                .unwrap();
        assert_eq!(config, QueueConfig::lossless(64, Duration::from_micros(1000)));
    }

    #[test]
    fn test_from_json_missing_fields_default() {
        let config = QueueConfig::from_json(r#"{"limit": 3}"#).unwrap();
        assert_eq!(config, QueueConfig::lossy(3));
    }

    #[test]
    fn test_from_json_rejects_bad_policy() {
        let err = QueueConfig::from_json(r#"{"policy": "grow"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}

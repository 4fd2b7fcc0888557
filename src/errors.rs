/*!
 * Error Types
 * Failure reasons for queue operations and configuration loading
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a push or pop did not complete
///
/// A capacity race (the predicate is false again after a wake) is reported
/// as `TimedOut`: the caller cannot distinguish it from an expired wait.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case")]
pub enum QueueError {
    #[error("Queue aborted")]
    #[diagnostic(
        code(queue::aborted),
        help("abort() is sticky. Create a new queue to resume producing or consuming.")
    )]
    Aborted,

    #[error("Timed out waiting on queue")]
    #[diagnostic(
        code(queue::timed_out),
        help("The wait expired before space or data became available. Retry or raise the timeout.")
    )]
    TimedOut,
}

/// Configuration loading errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid queue configuration JSON: {0}")]
    #[diagnostic(
        code(config::invalid_json),
        help("Expected an object with `limit`, `policy` and `timeout_us` fields.")
    )]
    Json(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for environment variable {var}")]
    #[diagnostic(
        code(config::invalid_env),
        help("Limits and timeouts are unsigned integers; drop flags are true/false/1/0.")
    )]
    Env { var: &'static str, value: String },
}

/// Result type for queue operations that report why they failed
pub type QueueResult<T> = Result<T, QueueError>;

/*!
 * Bounded Queue
 *
 * Producer/consumer FIFO with a capacity limit and two overflow policies:
 * - Drop mode: the oldest element is evicted, producers never wait
 * - Block mode: producers wait (optionally bounded) for consumers
 *
 * Consumers wait for data in both modes. `abort()` releases every waiter.
 */

#[cfg(feature = "tokio")]
mod async_ops;
mod config;
mod limited;
mod types;

pub use config::{OverflowPolicy, QueueConfig, ENV_ALLOW_DROP, ENV_LIMIT, ENV_TIMEOUT_US};
pub use limited::LimitedQueue;
pub use types::{PushError, Pushed, QueueStats};

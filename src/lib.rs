/*!
 * Limited Queue Library
 * Depth-limited thread-safe FIFO for producer/consumer backpressure
 */

pub mod errors;
pub mod monitoring;
pub mod queue;

// Re-exports
pub use errors::{ConfigError, QueueError, QueueResult};
pub use monitoring::init_tracing;
pub use queue::{LimitedQueue, OverflowPolicy, PushError, Pushed, QueueConfig, QueueStats};

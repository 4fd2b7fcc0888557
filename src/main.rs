/*!
 * Queue Soak Runner
 *
 * Drives a `LimitedQueue` with producer and consumer threads for a fixed
 * duration, then aborts it and reports the final statistics.
 *
 * Queue settings come from the `LIMITED_QUEUE_*` variables; the workload
 * from `LIMITED_QUEUE_SOAK_PRODUCERS`, `_CONSUMERS` and `_MILLIS`.
 */

use anyhow::{Context, Result};
use limited_queue::{init_tracing, LimitedQueue, QueueConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

fn env_or(var: &str, default: u64) -> Result<u64> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{var} must be an unsigned integer, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = QueueConfig::from_env().context("Failed to load queue configuration")?;
    let producers = env_or("LIMITED_QUEUE_SOAK_PRODUCERS", 4)?;
    let consumers = env_or("LIMITED_QUEUE_SOAK_CONSUMERS", 2)?;
    let millis = env_or("LIMITED_QUEUE_SOAK_MILLIS", 1000)?;

    info!(?config, producers, consumers, millis, "Starting queue soak");

    let queue = Arc::new(LimitedQueue::<u64>::with_config(config));

    let producer_handles: Vec<_> = (0..producers)
        .map(|id| {
            let queue = queue.clone();
            thread::Builder::new()
                .name(format!("producer-{id}"))
                .spawn(move || {
                    let mut seq = 0u64;
                    while !queue.is_aborted() {
                        queue.push(seq);
                        seq += 1;
                    }
                    seq
                })
        })
        .collect::<std::io::Result<_>>()
        .context("Failed to spawn producer")?;

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|id| {
            let queue = queue.clone();
            thread::Builder::new()
                .name(format!("consumer-{id}"))
                .spawn(move || {
                    let mut received = 0u64;
                    while !queue.is_aborted() {
                        if queue.pop().is_some() {
                            received += 1;
                        }
                    }
                    received
                })
        })
        .collect::<std::io::Result<_>>()
        .context("Failed to spawn consumer")?;

    thread::sleep(Duration::from_millis(millis));
    queue.abort();

    let mut attempted = 0u64;
    for handle in producer_handles {
        match handle.join() {
            Ok(count) => attempted += count,
            Err(_) => warn!("Producer thread panicked"),
        }
    }
    let mut received = 0u64;
    for handle in consumer_handles {
        match handle.join() {
            Ok(count) => received += count,
            Err(_) => warn!("Consumer thread panicked"),
        }
    }

    let stats = queue.stats();
    info!(attempted, received, "Soak finished");
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?
    );

    Ok(())
}

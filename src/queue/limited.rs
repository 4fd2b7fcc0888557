/*!
 * Limited Queue
 *
 * Depth-limited FIFO shared by any number of producer and consumer threads.
 *
 * One mutex guards the buffer and one condvar carries every wakeup. Each
 * state change broadcasts, so producers waiting for space and consumers
 * waiting for data share the same wait set and re-check their own predicate
 * after waking.
 */

use super::config::{OverflowPolicy, QueueConfig};
use super::types::{Counters, PushError, Pushed, QueueStats};
use crate::errors::{QueueError, QueueResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

type Buffer<T> = VecDeque<T>;

/// Depth-limited thread-safe queue with waiting push/pop and optional
/// dropping of the oldest element once the limit is reached.
///
/// # Examples
///
/// ```
/// use limited_queue::LimitedQueue;
/// use std::time::Duration;
///
/// let queue = LimitedQueue::new(2, true, Duration::ZERO);
/// assert!(queue.push(1));
/// assert!(queue.push(2));
/// // Full: 1 is evicted and the push reports the loss
/// assert!(!queue.push(3));
/// assert_eq!(queue.pop(), Some(2));
/// ```
pub struct LimitedQueue<T> {
    buffer: Mutex<Buffer<T>>,
    ready: Condvar,
    aborted: AtomicBool,
    config: QueueConfig,
    counters: Counters,
}

impl<T> LimitedQueue<T> {
    /// Create a queue
    ///
    /// `limit == 0` is unbounded; a zero `timeout` makes waits indefinite.
    pub fn new(limit: usize, allow_drop: bool, timeout: Duration) -> Self {
        Self::with_config(QueueConfig::new(limit, allow_drop, timeout))
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(config.limit.min(1024))),
            ready: Condvar::new(),
            aborted: AtomicBool::new(false),
            config,
            counters: Counters::default(),
        }
    }

    pub fn unbounded() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Push to the back of the queue
    ///
    /// Returns `false` if the queue is aborted, the wait for space expired,
    /// or, in drop mode, the oldest element was discarded to make room. In
    /// that last case the new element *is* stored.
    pub fn push(&self, item: T) -> bool {
        matches!(self.offer(item), Ok(Pushed::Stored))
    }

    /// Push an element built by `make` once a slot is granted
    ///
    /// `make` runs under the queue lock and is never called when the push is
    /// rejected. Return value as for [`push`](Self::push).
    pub fn push_with<F>(&self, make: F) -> bool
    where
        F: FnOnce() -> T,
    {
        match self.acquire_slot() {
            Ok((buffer, displaced)) => {
                let lossless = displaced.is_none();
                self.commit(buffer, make(), !lossless);
                lossless
            }
            Err(_) => {
                self.counters.record_reject();
                false
            }
        }
    }

    /// Push to the back, reporting exactly what happened
    ///
    /// A drop-mode eviction hands the evicted element back in
    /// [`Pushed::Displaced`]; a rejection hands back the pushed element.
    pub fn offer(&self, item: T) -> Result<Pushed<T>, PushError<T>> {
        match self.acquire_slot() {
            Ok((buffer, displaced)) => {
                self.commit(buffer, item, displaced.is_some());
                Ok(displaced.map_or(Pushed::Stored, Pushed::Displaced))
            }
            Err(reason) => {
                self.counters.record_reject();
                Err(PushError { reason, item })
            }
        }
    }

    /// Pop from the front, waiting for data if the queue is empty
    ///
    /// Returns `None` if the queue is aborted or the wait expired.
    pub fn pop(&self) -> Option<T> {
        self.take().ok()
    }

    /// Pop from the front, reporting why nothing was retrieved
    pub fn take(&self) -> QueueResult<T> {
        let mut buffer = self.buffer.lock();

        if self.aborted.load(Ordering::Acquire) {
            return Err(QueueError::Aborted);
        }

        if buffer.is_empty() {
            self.wait_until(&mut buffer, |buf| !buf.is_empty());

            if self.aborted.load(Ordering::Acquire) {
                return Err(QueueError::Aborted);
            }
        }

        let Some(item) = buffer.pop_front() else {
            debug!(
                timeout_us = self.config.timeout.as_micros() as u64,
                "Pop timed out on empty queue"
            );
            return Err(QueueError::TimedOut);
        };
        drop(buffer);

        self.counters.record_pop();
        // Space is available for producers blocked on a full queue
        self.ready.notify_all();
        Ok(item)
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Unbounded queues are never full
    pub fn is_full(&self) -> bool {
        if !self.config.is_bounded() {
            return false;
        }
        self.buffer.lock().len() >= self.config.limit
    }

    /// Discard all buffered elements
    ///
    /// The queue stays usable. Producers waiting for space wake and retry.
    pub fn clear(&self) {
        let discarded = {
            let mut buffer = self.buffer.lock();
            let discarded = std::mem::take(&mut *buffer);
            self.ready.notify_all();
            discarded
        };
        debug!(discarded = discarded.len(), "Queue cleared");
    }

    /// Set the termination flag and wake every waiter
    ///
    /// Every blocked and future push/pop fails. Buffered elements are kept
    /// until the queue is cleared or dropped.
    pub fn abort(&self) {
        let buffer = self.buffer.lock();
        self.aborted.store(true, Ordering::Release);
        self.ready.notify_all();
        debug!(buffered = buffer.len(), "Queue aborted");
    }

    /// Lock-free read of the termination flag
    ///
    /// Advisory only (e.g. "should I stop producing"); push and pop re-check
    /// the flag under the lock.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> usize {
        self.config.limit
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.config.policy
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn stats(&self) -> QueueStats {
        let length = self.len();
        let (pushed, popped, dropped, rejected) = self.counters.snapshot();
        QueueStats {
            length,
            limit: self.config.limit,
            policy: self.config.policy,
            aborted: self.is_aborted(),
            pushed,
            popped,
            dropped,
            rejected,
        }
    }

    /// Lock the buffer with a free slot at the tail
    ///
    /// In drop mode a full queue gives up its head, returned alongside the
    /// guard so it is released after the lock.
    fn acquire_slot(&self) -> QueueResult<(MutexGuard<'_, Buffer<T>>, Option<T>)> {
        let mut buffer = self.buffer.lock();

        if self.aborted.load(Ordering::Acquire) {
            return Err(QueueError::Aborted);
        }

        if !self.at_capacity(&buffer) {
            return Ok((buffer, None));
        }

        match self.config.policy {
            OverflowPolicy::DropOldest => {
                let displaced = buffer.pop_front();
                trace!(limit = self.config.limit, "Queue full, dropping oldest element");
                Ok((buffer, displaced))
            }
            OverflowPolicy::Block => {
                let limit = self.config.limit;
                self.wait_until(&mut buffer, |buf| buf.len() < limit);

                // Abort wins even if space appeared at the same time
                if self.aborted.load(Ordering::Acquire) {
                    return Err(QueueError::Aborted);
                }
                if self.at_capacity(&buffer) {
                    debug!(
                        limit,
                        timeout_us = self.config.timeout.as_micros() as u64,
                        "Push timed out on full queue"
                    );
                    return Err(QueueError::TimedOut);
                }
                Ok((buffer, None))
            }
        }
    }

    fn commit(&self, mut buffer: MutexGuard<'_, Buffer<T>>, item: T, displaced: bool) {
        buffer.push_back(item);
        drop(buffer);

        self.counters.record_push(displaced);
        // New data for blocked consumers
        self.ready.notify_all();
    }

    #[inline]
    fn at_capacity(&self, buffer: &Buffer<T>) -> bool {
        self.config.is_bounded() && buffer.len() >= self.config.limit
    }

    /// Block until `ready` holds or the queue is aborted, bounded by the
    /// configured timeout. Callers re-check state afterwards; the wake
    /// reason is not reported.
    fn wait_until<F>(&self, buffer: &mut MutexGuard<'_, Buffer<T>>, mut ready: F)
    where
        F: FnMut(&Buffer<T>) -> bool,
    {
        let waiting = |buf: &mut Buffer<T>| !ready(&*buf) &&!self.aborted.load(Ordering::Acquire);

        match self.config.wait_timeout() {
            Some(timeout) => {
                trace!(timeout_us = timeout.as_micros() as u64, "Waiting on queue");
                if self.ready.wait_while_for(buffer, waiting, timeout).timed_out() {
                    trace!("Queue wait expired");
                }
            }
            None => {
                trace!("Waiting on queue without timeout");
                self.ready.wait_while(buffer, waiting);
            }
        }
    }
}

impl<T> Default for LimitedQueue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> From<QueueConfig> for LimitedQueue<T> {
    fn from(config: QueueConfig) -> Self {
        Self::with_config(config)
    }
}

impl<T> fmt::Debug for LimitedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitedQueue")
            .field("len", &self.len())
            .field("limit", &self.config.limit)
            .field("policy", &self.config.policy)
            .field("timeout", &self.config.timeout)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_unbounded_never_full() {
        let queue = LimitedQueue::unbounded();
        for i in 0..10_000 {
            assert!(queue.push(i));
        }
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 10_000);
    }

    #[test]
    fn test_drop_mode_evicts_head() {
        let queue = LimitedQueue::new(3, true, Duration::ZERO);
        for i in 0..3 {
            assert!(queue.push(i));
        }
        assert!(queue.is_full());
        assert_eq!(queue.offer(3), Ok(Pushed::Displaced(0)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
    }

    #[test]
    fn test_block_mode_times_out_and_returns_item() {
        let queue = LimitedQueue::new(1, false, Duration::from_millis(10));
        assert!(queue.push("a"));

        let err = queue.offer("b").unwrap_err();
        assert_eq!(err.reason, QueueError::TimedOut);
        assert_eq!(err.into_inner(), "b");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_timeout_on_empty() {
        let queue = LimitedQueue::<u32>::new(4, false, Duration::from_millis(20));
        let start = Instant::now();
        assert_eq!(queue.take(), Err(QueueError::TimedOut));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_aborted_calls_fail_fast() {
        let queue = LimitedQueue::new(0, true, Duration::ZERO);
        assert!(queue.push(1));
        queue.abort();

        assert!(queue.is_aborted());
        assert!(!queue.push(2));
        assert_eq!(queue.take(), Err(QueueError::Aborted));
        // Abort does not clear
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_push_with_skips_constructor_when_rejected() {
        let queue = LimitedQueue::new(1, false, Duration::from_millis(5));
        assert!(queue.push_with(|| String::from("first")));

        let mut called = false;
        assert!(!queue.push_with(|| {
            called = true;
            String::from("second")
        }));
        assert!(!called);
    }

    #[test]
    fn test_blocked_push_released_by_pop() {
        let queue = Arc::new(LimitedQueue::new(1, false, Duration::ZERO));
        assert!(queue.push(1));

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.pop(), Some(1));

        assert!(producer.join().unwrap());
        assert_eq!(queue.pop(), Some(2));
    }

    #[test]
    fn test_stats_counters() {
        let queue = LimitedQueue::new(2, true, Duration::ZERO);
        for i in 0..5 {
            queue.push(i);
        }
        queue.pop();

        let stats = queue.stats();
        assert_eq!(stats.length, 1);
        assert_eq!(stats.pushed, 5);
        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.popped, 1);
        assert_eq!(stats.rejected, 0);
        assert!(!stats.aborted);
    }
}

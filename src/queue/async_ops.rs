/*!
 * Async Bridge
 *
 * Runs blocking push/pop on tokio's blocking pool so async callers never
 * park a runtime worker thread.
 */

use super::limited::LimitedQueue;
use crate::errors::{QueueError, QueueResult};
use std::sync::Arc;
use tracing::warn;

impl<T> LimitedQueue<T>
where
    T: Send + 'static,
{
    /// Async-compatible [`push`](LimitedQueue::push) using `spawn_blocking`
    ///
    /// A failed blocking task reports `false`.
    pub async fn push_async(self: &Arc<Self>, item: T) -> bool {
        let queue = Arc::clone(self);
        tokio::task::spawn_blocking(move || queue.push(item))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Blocking push task failed");
                false
            })
    }

    /// Async-compatible [`pop`](LimitedQueue::pop) using `spawn_blocking`
    pub async fn pop_async(self: &Arc<Self>) -> Option<T> {
        self.take_async().await.ok()
    }

    /// Async-compatible [`take`](LimitedQueue::take); a failed blocking task
    /// is reported as `Aborted`
    pub async fn take_async(self: &Arc<Self>) -> QueueResult<T> {
        let queue = Arc::clone(self);
        tokio::task::spawn_blocking(move || queue.take())
            .await
            .map_err(|e| {
                warn!(error = %e, "Blocking pop task failed");
                QueueError::Aborted
            })?
    }
}

/*!
 * Async Bridge Tests
 */
#![cfg(feature = "tokio")]

use limited_queue::{LimitedQueue, QueueError};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_pop_async() {
    let queue = Arc::new(LimitedQueue::new(2, false, Duration::from_secs(1)));

    assert!(queue.push_async(1).await);
    assert!(queue.push_async(2).await);
    assert_eq!(queue.pop_async().await, Some(1));
    assert_eq!(queue.pop_async().await, Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_abort_releases_async_consumer() {
    let queue = Arc::new(LimitedQueue::<u32>::new(0, true, Duration::ZERO));

    let waiter = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.take_async().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.abort();

    assert_eq!(waiter.await.unwrap(), Err(QueueError::Aborted));
}

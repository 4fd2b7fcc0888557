/*!
 * Queue Types
 * Push outcomes and statistics snapshots
 */

use super::config::OverflowPolicy;
use crate::errors::QueueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Successful insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pushed<T> {
    /// Stored without disturbing other elements
    Stored,
    /// Stored after evicting the oldest element, which is handed back
    Displaced(T),
}

impl<T> Pushed<T> {
    /// True when nothing was discarded. This is the value `push` reports.
    pub fn is_lossless(&self) -> bool {
        matches!(self, Pushed::Stored)
    }

    pub fn into_displaced(self) -> Option<T> {
        match self {
            Pushed::Stored => None,
            Pushed::Displaced(old) => Some(old),
        }
    }
}

/// Rejected insert; the element is returned to the caller
#[derive(Debug, PartialEq, Eq)]
pub struct PushError<T> {
    pub reason: QueueError,
    pub item: T,
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "push rejected: {}", self.reason)
    }
}

impl<T: fmt::Debug> std::error::Error for PushError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Point-in-time queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub length: usize,
    pub limit: usize,
    pub policy: OverflowPolicy,
    pub aborted: bool,
    /// Elements stored, drop-mode inserts included
    pub pushed: u64,
    pub popped: u64,
    /// Oldest elements evicted in drop mode
    pub dropped: u64,
    /// Inserts refused because of abort or timeout
    pub rejected: u64,
}

/// Lifetime counters, updated outside of any ordering guarantees
#[derive(Debug, Default)]
pub(super) struct Counters {
    pushed: AtomicU64,
    popped: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    #[inline]
    pub fn record_push(&self, displaced: bool) {
        self.pushed.fetch_add(1, Ordering::Relaxed);
        if displaced {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_pop(&self) {
        self.popped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reject(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// (pushed, popped, dropped, rejected)
    pub fn snapshot(&self) -> (u64, u64, u64, u64) {
        (
            self.pushed.load(Ordering::Relaxed),
            self.popped.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
            self.rejected.load(Ordering::Relaxed),
        )
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory holding area for log entries whose send failed with a
//! retriable error.
//!
//! Entries stay in FIFO order until the caller flushes or clears the queue.
//! Nothing is persisted: the queue is lost when the process exits. Without a
//! configured bound the queue grows for as long as the API is unreachable.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use tracing::warn;

use crate::entry::LogEntry;

pub trait RetryQueue: Send + Sync {
    /// Appends an entry. Never fails.
    fn add(&self, entry: LogEntry);

    /// Copy of the current contents, unaffected by later mutation.
    fn get_all(&self) -> Vec<LogEntry>;

    /// Takes every entry out in one step, leaving the queue empty.
    fn drain(&self) -> Vec<LogEntry>;

    fn clear(&self);

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// [`RetryQueue`] behind a reader/writer lock, optionally bounded.
///
/// When a bound is set and reached, the oldest entry is evicted to make room.
#[derive(Debug, Default)]
pub struct InMemoryRetryQueue {
    entries: RwLock<VecDeque<LogEntry>>,
    max_size: Option<usize>,
}

impl InMemoryRetryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bounded(max_size: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_size: Some(max_size),
        }
    }

    #[must_use]
    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }
}

impl RetryQueue for InMemoryRetryQueue {
    fn add(&self, entry: LogEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(max_size) = self.max_size {
            if max_size == 0 {
                warn!("Retry queue has zero capacity, dropping log entry");
                return;
            }
            while entries.len() >= max_size {
                entries.pop_front();
                warn!(
                    "Retry queue reached its limit of {} entries, dropping oldest entry",
                    max_size
                );
            }
        }
        entries.push_back(entry);
    }

    fn get_all(&self) -> Vec<LogEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }

    fn drain(&self) -> Vec<LogEntry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.drain(..).collect()
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    fn size(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

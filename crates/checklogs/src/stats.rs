// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client-side counters of send attempts and failures.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};

pub trait StatsManager: Send + Sync {
    /// Records a send attempt. Called once per entry that passed validation.
    fn increment_logs(&self);

    /// Records a failed send attempt.
    fn increment_errors(&self);

    fn get_stats(&self) -> StatsSnapshot;
}

/// Consistent view of the counters, taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_logs: u64,
    pub total_errors: u64,
    pub last_log_time: Option<DateTime<Utc>>,
    /// `100 * total_errors / total_logs`, or `0` before the first send.
    pub error_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    total_logs: u64,
    total_errors: u64,
    last_log_time: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct InMemoryStats {
    counters: RwLock<Counters>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStats {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamps `last_log_time` from `clock` instead of the system time.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: RwLock::new(Counters::default()),
            clock,
        }
    }
}

impl Default for InMemoryStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsManager for InMemoryStats {
    fn increment_logs(&self) {
        let now = self.clock.now();
        let mut counters = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        counters.total_logs += 1;
        counters.last_log_time = Some(now);
    }

    fn increment_errors(&self) {
        let mut counters = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        counters.total_errors += 1;
    }

    fn get_stats(&self) -> StatsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        StatsSnapshot {
            total_logs: counters.total_logs,
            total_errors: counters.total_errors,
            last_log_time: counters.last_log_time,
            error_rate: error_rate(counters.total_logs, counters.total_errors),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn error_rate(total_logs: u64, total_errors: u64) -> f64 {
    if total_logs == 0 {
        return 0.0;
    }
    total_errors as f64 / total_logs as f64 * 100.0
}

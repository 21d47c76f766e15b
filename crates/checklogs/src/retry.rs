// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Pacing for repeated, caller-triggered flush rounds.

use std::time::Duration;

use crate::constants::MAX_BACKOFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Up to `n` flush rounds with no pause between them.
    Immediate(u64),
    /// Up to `n` rounds, sleeping `delay_ms` between them.
    LinearBackoff(u64, u64),
    /// Up to `attempts` rounds, sleeping `base_delay_ms * 2^round` between
    /// them, capped at [`MAX_BACKOFF`].
    ExponentialBackoff { attempts: u64, base_delay_ms: u64 },
}

impl RetryStrategy {
    #[must_use]
    pub fn max_attempts(&self) -> u64 {
        match self {
            RetryStrategy::Immediate(attempts)
            | RetryStrategy::LinearBackoff(attempts, _)
            | RetryStrategy::ExponentialBackoff { attempts, .. } => *attempts,
        }
    }

    /// Pause after the `attempt`-th round (0-based) failed.
    #[must_use]
    pub fn delay(&self, attempt: u64) -> Duration {
        match self {
            RetryStrategy::Immediate(_) => Duration::ZERO,
            RetryStrategy::LinearBackoff(_, delay_ms) => Duration::from_millis(*delay_ms),
            RetryStrategy::ExponentialBackoff { base_delay_ms, .. } => {
                exponential_backoff(attempt, Duration::from_millis(*base_delay_ms))
            }
        }
    }
}

/// `base * 2^attempt`, capped at [`MAX_BACKOFF`].
#[must_use]
pub fn exponential_backoff(attempt: u64, base: Duration) -> Duration {
    let factor = 1u32.checked_shl(u32::try_from(attempt).unwrap_or(u32::MAX));
    match factor {
        Some(factor) => base.saturating_mul(factor).min(MAX_BACKOFF),
        None => MAX_BACKOFF,
    }
}

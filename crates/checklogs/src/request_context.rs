// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Caller-supplied lifetime for a single API call.
//!
//! A [`RequestContext`] bounds a network call by an optional deadline and a
//! [`CancellationToken`]. The client applies whichever of the deadline and its
//! own configured timeout is tighter. Expiry or cancellation surfaces as a
//! network error, so a `log` call interrupted this way still lands in the
//! retry queue.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::transport::TransportError;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestContext {
    /// No deadline, never cancelled unless the token is cancelled later.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Binds the context to `token`; cancelling it aborts in-flight calls.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The tighter of `timeout` and the time left until the deadline.
    #[must_use]
    pub fn effective_timeout(&self, timeout: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => timeout.min(deadline.saturating_duration_since(Instant::now())),
            None => timeout,
        }
    }

    /// Drives `fut` until it completes, the context is cancelled, or
    /// `timeout` (tightened by the deadline) elapses.
    pub async fn run<F, T>(&self, timeout: Duration, fut: F) -> Result<T, TransportError>
    where
        F: std::future::Future<Output = Result<T, TransportError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(TransportError::cancelled());
        }
        let timeout = self.effective_timeout(timeout);
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(TransportError::cancelled()),
            result = tokio::time::timeout(timeout, fut) => match result {
                Ok(result) => result,
                Err(_) => Err(TransportError::timeout(format!(
                    "request did not complete within {timeout:?}"
                ))),
            },
        }
    }

    /// Sleeps for `delay`, returning early with `false` if the context is
    /// cancelled or its deadline passes first.
    pub async fn sleep(&self, delay: Duration) -> bool {
        let remaining = self.effective_timeout(delay);
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(remaining) => remaining == delay,
        }
    }
}

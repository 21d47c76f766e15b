// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

use tracing::warn;

use crate::context;
use crate::logger::Logger;
use crate::request_context::RequestContext;

/// Measures one operation and reports it through the logger that started it.
///
/// Created by [`Logger::time`].
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    name: String,
    message: String,
    logger: Logger,
}

impl Timer {
    pub(crate) fn start(logger: Logger, name: String, message: String) -> Self {
        Self {
            start: Instant::now(),
            name,
            message,
            logger,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time elapsed so far. Does not log or reset anything.
    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stops the timer and emits one info entry with `operation` and
    /// `duration_ms` in its context.
    ///
    /// A failed send is reported through `tracing` only; the measured
    /// duration is returned either way.
    pub async fn end(self, ctx: &RequestContext) -> Duration {
        let duration = self.start.elapsed();
        let message = format!("{} completed in {:?}", self.message, duration);
        let context = context! {
            "operation": self.name,
            "duration_ms": u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        };

        if let Err(e) = self.logger.info(ctx, &message, Some(context)).await {
            warn!("Failed to report timer '{}': {}", self.name, e);
        }
        duration
    }
}
